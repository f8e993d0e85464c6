//! Layer composition for configuration tests.

use ortho_config::MergeComposer;
use serde_json::Value;

use crate::CooldownConfig;

/// Source a configuration layer stands in for, lowest precedence first.
#[derive(Debug, Clone, Copy)]
pub enum Layer {
    Defaults,
    File,
    Environment,
    Cli,
}

/// Merges `layers` in order, as `load` would after discovery.
pub fn compose(layers: &[(Layer, Value)]) -> CooldownConfig {
    let composer = layers.iter().cloned().fold(
        MergeComposer::new(),
        |mut composer, (layer, value)| {
            match layer {
                Layer::Defaults => composer.push_defaults(value),
                Layer::File => composer.push_file(value, None),
                Layer::Environment => composer.push_environment(value),
                Layer::Cli => composer.push_cli(value),
            }
            composer
        },
    );

    CooldownConfig::merge_from_layers(composer.layers())
        .unwrap_or_else(|error| panic!("layers should merge into a config: {error}"))
}
