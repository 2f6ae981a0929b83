// End-to-end tests of the two-pass key estimator through the public API.
//
// These exercise whole configurations (named profile combinations, JSON
// configs) rather than single modules; the per-module invariants live in
// each module's unit tests.

use keytracker_hmm::profiles::DistanceProfile;
use keytracker_hmm::rotation::TransitionTable;
use keytracker_hmm::viterbi::decode;
use keytracker_hmm::{
    DenseTable, DistanceProfileName, Key, KeyModel, KeyProfileName, KeyTrackerConfig,
    KeyTrackerError, ProbabilityTable, estimate_key,
};

/// I - IV - I - V - I outline in C major.
const C_MAJOR_MELODY: [u8; 15] = [0, 4, 7, 0, 4, 7, 5, 9, 0, 7, 11, 2, 7, 4, 0];

/// Twenty notes in C major followed by eleven in G major (with F#).
const C_TO_G_MELODY: [u8; 31] = [
    0, 4, 7, 0, 4, 7, 5, 9, 0, 7, 11, 2, 7, 4, 0, 2, 4, 5, 7, 0, //
    7, 11, 2, 7, 6, 7, 9, 11, 2, 6, 7,
];

#[test]
fn test_every_named_configuration_decodes() {
    for transitions in DistanceProfileName::ALL {
        for key_profile in KeyProfileName::ALL {
            let model = KeyModel::from_names(transitions, key_profile);
            let estimate = model.estimate(&C_MAJOR_MELODY).unwrap();
            assert_eq!(estimate.local_path.len(), C_MAJOR_MELODY.len());
            let again = model.estimate(&C_MAJOR_MELODY).unwrap();
            assert_eq!(estimate, again, "{transitions} / {key_profile}");
        }
    }
}

#[test]
fn test_probability_profiles_find_c_major() {
    for transitions in [
        DistanceProfileName::Exponential,
        DistanceProfileName::Exponential10,
        DistanceProfileName::NoModulation,
    ] {
        for key_profile in KeyProfileName::ALL {
            let model = KeyModel::from_names(transitions, key_profile);
            let estimate = estimate_key(&C_MAJOR_MELODY, &model).unwrap();
            assert_eq!(
                estimate.global_key,
                Key::major(0),
                "{transitions} / {key_profile}"
            );
        }
    }
}

#[test]
fn test_local_path_follows_modulation_global_keeps_home_key() {
    let model = KeyModel::from_config(&KeyTrackerConfig::default()).unwrap();
    let estimate = model.estimate(&C_TO_G_MELODY).unwrap();

    assert_eq!(estimate.local_path.first(), Some(&Key::major(0)));
    assert_eq!(estimate.local_path.last(), Some(&Key::major(7)));
    assert_eq!(estimate.local_modulations(), 1);
    assert_eq!(estimate.global_key, Key::major(0));
    assert!(estimate.is_confident());
}

#[test]
fn test_no_modulation_local_path_is_constant() {
    let model = KeyModel::from_names(DistanceProfileName::NoModulation, KeyProfileName::Temperley);
    let estimate = model.estimate(&C_TO_G_MELODY).unwrap();
    assert_eq!(estimate.local_modulations(), 0);
    assert_eq!(estimate.global_key, estimate.local_path[0]);
}

#[test]
fn test_no_modulation_table_is_identity_for_every_key() {
    let table =
        TransitionTable::from_profile(&DistanceProfile::named(DistanceProfileName::NoModulation));
    for from in Key::ALL {
        for to in Key::ALL {
            let p = table.probability(from.index(), to.index());
            assert_eq!(p, if from == to { 1.0 } else { 0.0 });
        }
    }
}

#[test]
fn test_json_config_drives_model() {
    let config = KeyTrackerConfig::from_json_str(
        r#"{ "transitions": "exponential", "key_profile": "krumhansl-kessler" }"#,
    )
    .unwrap();
    let from_json = KeyModel::from_config(&config).unwrap();
    let from_names = KeyModel::from_names(
        DistanceProfileName::Exponential,
        KeyProfileName::KrumhanslKessler,
    );
    assert_eq!(
        from_json.estimate(&C_TO_G_MELODY).unwrap(),
        from_names.estimate(&C_TO_G_MELODY).unwrap()
    );
}

#[test]
fn test_configuration_errors_surface_before_decoding() {
    let config = KeyTrackerConfig::from_json_str(r#"{ "key_profile": "mystery" }"#).unwrap();
    let err = KeyModel::from_config(&config).unwrap_err();
    assert!(matches!(err, KeyTrackerError::UnknownProfile { kind: "key", .. }));
    assert!(err.is_configuration_error());
}

#[test]
fn test_decoder_accepts_caller_defined_model() {
    let sticky = DenseTable::from_rows(&[vec![0.9, 0.1], vec![0.1, 0.9]]).unwrap();
    let noisy = DenseTable::from_rows(&[vec![0.9, 0.1], vec![0.1, 0.9]]).unwrap();
    let path = decode(&[0, 0, 1, 1, 1], &[0.5, 0.5], &sticky, &noisy).unwrap();
    assert_eq!(path.states, vec![0, 0, 1, 1, 1]);

    let three_states = DenseTable::from_rows(&vec![vec![1.0 / 3.0; 3]; 3]).unwrap();
    let err = decode(&[0, 1], &[0.5, 0.5], &three_states, &noisy).unwrap_err();
    assert!(matches!(
        err,
        KeyTrackerError::DimensionMismatch {
            expected: 2,
            actual: 3,
            ..
        }
    ));
}
