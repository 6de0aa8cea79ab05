//! Checks the exported artifact against what `tf.loadLayersModel` reads.

use std::fs;

use rand::{rngs::StdRng, SeedableRng};
use serde_json::Value;
use tfjs_classifier::tfjs::{self, read_model_json};
use tfjs_classifier::{Network, NetworkSpec};

fn trained_like_network() -> Network {
    Network::from_spec(&NetworkSpec::default(), &mut StdRng::seed_from_u64(42)).unwrap()
}

#[test]
fn manifest_byte_count_matches_shards() {
    let tmp = tempfile::tempdir().unwrap();
    let saved = tfjs::save_layers_model_with_shard_size(&trained_like_network(), None, tmp.path(), 2048).unwrap();

    let model = read_model_json(tmp.path()).unwrap();
    let group = &model.weights_manifest[0];
    let elements: usize = group.weights.iter().map(|w| w.shape.iter().product::<usize>()).sum();

    let on_disk: u64 = saved.shards.iter().map(|p| fs::metadata(p).unwrap().len()).sum();
    assert_eq!(on_disk as usize, elements * 4);
    assert_eq!(group.paths.len(), saved.shards.len());
    assert_eq!(group.paths.last().unwrap(), &format!("group1-shard{0}of{0}.bin", group.paths.len()));
}

#[test]
fn kernel_bytes_are_row_major_input_by_units() {
    let tmp = tempfile::tempdir().unwrap();
    let net = trained_like_network();
    let saved = tfjs::save_layers_model(&net, None, tmp.path()).unwrap();
    let bytes = fs::read(&saved.shards[0]).unwrap();

    let tfjs_classifier::network::Layer::Dense(first) = &net.layers[0] else { panic!("first layer is dense") };
    // Element [1][2] of the [4, 64] kernel sits at index 1 * 64 + 2.
    let idx = 64 + 2;
    let stored = f32::from_le_bytes(bytes[idx * 4..idx * 4 + 4].try_into().unwrap());
    assert_eq!(stored, first.weights.get(1, 2) as f32);
}

#[test]
fn topology_is_plain_json_a_browser_can_read() {
    let tmp = tempfile::tempdir().unwrap();
    tfjs::save_layers_model(&trained_like_network(), None, tmp.path()).unwrap();

    let raw = fs::read_to_string(tmp.path().join("model.json")).unwrap();
    let json: Value = serde_json::from_str(&raw).unwrap();
    assert!(json.get("trainingConfig").is_none());
    assert_eq!(json["modelTopology"]["config"]["name"], "sequential");
    assert_eq!(json["modelTopology"]["backend"], "tensorflow");
    assert!(json["convertedBy"].as_str().unwrap().starts_with("tfjs-classifier"));
}
