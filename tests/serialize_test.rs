#![cfg(feature = "serialize")]
extern crate ising;
use ising::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[test]
fn params_from_json() {
    let json = r#"{
        "rows": 8,
        "cols": 6,
        "coupling": 1.0,
        "temperature": 2.5,
        "field": -0.25,
        "init": "AllDown",
        "seed": 17
    }"#;
    let params: IsingParams = serde_json::from_str(json).unwrap();
    assert_eq!(params.n_sites(), 48);
    assert_eq!(params.init, InitPolicy::AllDown);
    let engine = IsingEngine::new(params).unwrap();
    assert_eq!(engine.magnetization(), -48);
}

#[test]
fn snapshot_round_trip() {
    let params = IsingParams::new(5, 5, 1.0, 2.0, 0.1).with_init(InitPolicy::Random);
    let mut engine = IsingEngine::new_with_rng(params, SmallRng::seed_from_u64(4)).unwrap();
    let _ = engine.run(300).count();
    let snapshot = engine.current_snapshot();
    let s = serde_json::to_string(&snapshot).unwrap();
    let back: Snapshot = serde_json::from_str(&s).unwrap();
    assert_eq!(back.lattice, snapshot.lattice);
    assert_eq!(back.magnetization(), snapshot.magnetization());
    assert_eq!(back.observables.step, 300);
}

#[test]
fn lattice_rejects_bad_buffers() {
    let short = serde_json::from_str::<Lattice>(r#"{"rows":3,"cols":3,"spins":[1,1]}"#);
    assert!(short.is_err());
    let bad_values = serde_json::from_str::<Lattice>(r#"{"rows":2,"cols":2,"spins":[1,0,5,1]}"#);
    assert!(bad_values.is_err());
    let too_small = serde_json::from_str::<Lattice>(r#"{"rows":1,"cols":2,"spins":[1,1]}"#);
    assert!(too_small.is_err());

    let lattice: Lattice =
        serde_json::from_str(r#"{"rows":2,"cols":2,"spins":[1,-1,-1,1]}"#).unwrap();
    assert_eq!(lattice.magnetization(), 0);
    let params = IsingParams::new(2, 2, 1.0, 1.0, 0.0);
    let engine =
        IsingEngine::new_with_lattice(params, lattice, SmallRng::seed_from_u64(0)).unwrap();
    assert_eq!(engine.magnetization(), 0);
}
