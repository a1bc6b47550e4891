criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .sample_size(20)
        .measurement_time(std::time::Duration::from_secs(2));
    targets =
        pricing_full_board,
        pricing_late_board,
        dealing_full_game,
        playing_to_offer,
}

use deal_engine::core::ContainerId;
use deal_engine::policy::{BankerOfferPolicy, OfferContext, OfferPolicy, LADDER_25};
use deal_engine::rules::Engine;

fn pricing_full_board(c: &mut criterion::Criterion) {
    let policy = BankerOfferPolicy::default();
    c.bench_function("price an offer over 25 amounts", |b| {
        b.iter(|| {
            let ctx = OfferContext::new(25, &LADDER_25, 0, None).unwrap();
            policy.offer(std::hint::black_box(&ctx)).unwrap()
        })
    });
}

fn pricing_late_board(c: &mut criterion::Criterion) {
    let policy = BankerOfferPolicy::default();
    let amounts = [1, 75_000, 1_000_000];
    c.bench_function("price an offer over 3 amounts", |b| {
        b.iter(|| {
            let ctx = OfferContext::new(25, &amounts, 22, Some(200_000)).unwrap();
            policy.offer(std::hint::black_box(&ctx)).unwrap()
        })
    });
}

fn dealing_full_game(c: &mut criterion::Criterion) {
    c.bench_function("deal a 25-case game", |b| {
        b.iter(|| Engine::new(25, 42).unwrap().start().unwrap())
    });
}

fn playing_to_offer(c: &mut criterion::Criterion) {
    let mut engine = Engine::new(25, 42).unwrap();
    let dealt = engine.start().unwrap();
    c.bench_function("pick, open 6 and compute an offer", |b| {
        b.iter(|| {
            let mut state = engine.pick_player_case(&dealt, ContainerId::new(1)).unwrap();
            state = engine.choose_to_open(&state, 6).unwrap();
            for id in 2..=7 {
                state = engine.open_case(&state, ContainerId::new(id)).unwrap();
            }
            engine.compute_offer(&state).unwrap()
        })
    });
}
