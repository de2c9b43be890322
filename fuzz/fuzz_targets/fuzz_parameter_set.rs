//! Fuzz target for parameter-set loading
//!
//! Arbitrary bytes are parsed as a JSON parameter set. Anything that loads
//! must evaluate without panicking and must reach a leaf within its depth.

#![no_main]

use clausekeep_ml::models::TreeEnsemble;
use clausekeep_ml::{FeatureVector, NUM_FEATURES};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(ensemble) = TreeEnsemble::from_json_slice(data) else {
        return;
    };

    let probes = [0.0, -1.0, 1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY];
    for probe in probes {
        let features = FeatureVector::from_values([probe; NUM_FEATURES]);
        let vote = ensemble.evaluate(&features);
        assert!(vote.discard_votes <= vote.scores.len());

        for tree in ensemble.trees() {
            let path = tree.decision_path(&features);
            assert!(path.len() <= tree.info().max_depth + 1);
        }
    }

    // Whatever loaded must also serialize and load back.
    if let Ok(json) = ensemble.to_json() {
        assert!(TreeEnsemble::from_json_slice(json.as_bytes()).is_ok());
    }
});
