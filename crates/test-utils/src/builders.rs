#![allow(dead_code)]

use std::collections::BTreeMap;

use bootstrapper::config::{ConfigFile, ConfigSection, RawConfigFile, StepConfig};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                step: Vec::new(),
            },
        }
    }

    pub fn with_step(mut self, step: StepConfig) -> Self {
        self.config.step.push(step);
        self
    }

    pub fn kill_on_timeout(mut self, val: bool) -> Self {
        self.config.config.kill_on_timeout = val;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `StepConfig`.
pub struct StepConfigBuilder {
    step: StepConfig,
}

impl StepConfigBuilder {
    pub fn new(name: &str, exe: &str) -> Self {
        Self {
            step: StepConfig {
                name: name.to_string(),
                exe: exe.to_string(),
                args: vec![],
                working_dir: None,
                timeout_ms: None,
                env: BTreeMap::new(),
                continue_on_failure: false,
                fail_on_error_output: false,
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.step.args.push(arg.to_string());
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.step.timeout_ms = Some(ms);
        self
    }

    pub fn env(mut self, name: &str, value: &str) -> Self {
        self.step.env.insert(name.to_string(), value.to_string());
        self
    }

    pub fn continue_on_failure(mut self, val: bool) -> Self {
        self.step.continue_on_failure = val;
        self
    }

    pub fn fail_on_error_output(mut self, val: bool) -> Self {
        self.step.fail_on_error_output = val;
        self
    }

    pub fn build(self) -> StepConfig {
        self.step
    }
}
