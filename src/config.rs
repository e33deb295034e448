use crate::codec::RestRates;

/// Automouse layer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutomouseConfig {
    /// Keymap layer to activate on motion
    pub layer: u8,
    /// Minimum `|dx| + |dy|` of a single sample that (re)activates the layer
    pub movement_threshold: u32,
    /// Inactivity time after which the layer is released, in milliseconds
    pub timeout_ms: u32,
}

impl AutomouseConfig {
    pub const fn new(layer: u8) -> Self {
        Self {
            layer,
            movement_threshold: 5,
            timeout_ms: 400,
        }
    }

    pub const fn with_movement_threshold(mut self, threshold: u32) -> Self {
        self.movement_threshold = threshold;
        self
    }

    pub const fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Load-time configuration
///
/// Nothing here is validated up front. Values the chip cannot represent make
/// the configure step of the power-up sequence fail with
/// [`Error::OutOfRange`](crate::Error::OutOfRange).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Resolution applied during power-up, in counts per inch
    pub cpi: u32,
    pub swap_xy: bool,
    pub invert_x: bool,
    pub invert_y: bool,
    /// Toggle the chip's smart mode from the shutter value of each sample
    pub smart_algorithm: bool,
    /// Minimum time between two reports, 0 reports every sample
    pub report_interval_min_ms: u32,
    pub run_downshift_time_ms: u32,
    pub rest1_downshift_time_ms: u32,
    pub rest2_downshift_time_ms: u32,
    pub rest1_sample_time_ms: u32,
    pub rest2_sample_time_ms: u32,
    pub rest3_sample_time_ms: u32,
    /// Added to the 10 ms the chip needs after power-up
    pub power_up_extra_delay_ms: u32,
    pub automouse: Option<AutomouseConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpi: 600,
            swap_xy: false,
            invert_x: false,
            invert_y: false,
            smart_algorithm: false,
            report_interval_min_ms: 0,
            run_downshift_time_ms: 128,
            rest1_downshift_time_ms: 9220,
            rest2_downshift_time_ms: 150_000,
            rest1_sample_time_ms: 40,
            rest2_sample_time_ms: 100,
            rest3_sample_time_ms: 500,
            power_up_extra_delay_ms: 0,
            automouse: None,
        }
    }
}

impl Config {
    pub fn with_cpi(mut self, cpi: u32) -> Self {
        self.cpi = cpi;
        self
    }

    pub fn with_axes(mut self, swap_xy: bool, invert_x: bool, invert_y: bool) -> Self {
        self.swap_xy = swap_xy;
        self.invert_x = invert_x;
        self.invert_y = invert_y;
        self
    }

    pub fn with_smart_algorithm(mut self, enabled: bool) -> Self {
        self.smart_algorithm = enabled;
        self
    }

    pub fn with_report_interval_min_ms(mut self, ms: u32) -> Self {
        self.report_interval_min_ms = ms;
        self
    }

    pub fn with_automouse(mut self, automouse: AutomouseConfig) -> Self {
        self.automouse = Some(automouse);
        self
    }

    /// The rest periods the rest downshift registers count in
    ///
    /// These are the configured values, a runtime change of a rest sample time
    /// does not rescale the downshift units.
    pub fn rest_rates(&self) -> RestRates {
        RestRates {
            rest1_ms: self.rest1_sample_time_ms,
            rest2_ms: self.rest2_sample_time_ms,
        }
    }
}
