//! PWM engine: programs derived values into a timer peripheral
//!
//! The engine owns its [`PwmTimer`] instance, so the borrow checker enforces
//! a single logical owner per timer. Sharing one physical timer
//! between tasks needs an external mutex around the engine (one per
//! peripheral instance); interleaved partial writes would tear the
//! configuration.

use cadence_hal::PwmTimer;
use heapless::Vec;

use super::{compute_compare, ChannelSpec, ConfigError, TimerConfig, MAX_CHANNELS};

/// Errors from programming the timer peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ApplyError<E> {
    /// The configuration itself is invalid for this timer
    Config(ConfigError),
    /// The peripheral reported a fault; treat as fatal to initialization
    Hardware(E),
    /// Duty or enable update requested before a successful `apply`
    NotConfigured,
}

impl<E> From<ConfigError> for ApplyError<E> {
    fn from(err: ConfigError) -> Self {
        ApplyError::Config(err)
    }
}

/// Programs a [`TimerConfig`] into a timer and manages later updates
///
/// Write ordering is fixed so that an enabled output never sees a
/// half-written configuration: time base first, then all compare values
/// (preload-armed), and only then the per-channel output enables. Any error
/// is returned before the first output enable, so a failed `apply` leaves
/// every output disconnected.
///
/// Starting the counter is the caller's job, after `apply` succeeds.
pub struct PwmEngine<T: PwmTimer> {
    timer: T,
    applied: Option<TimerConfig>,
}

impl<T: PwmTimer> PwmEngine<T> {
    /// Wrap a timer peripheral; no registers are touched yet
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            applied: None,
        }
    }

    /// Whether a configuration has been applied
    pub fn is_configured(&self) -> bool {
        self.applied.is_some()
    }

    /// The last successfully applied configuration
    pub fn config(&self) -> Option<&TimerConfig> {
        self.applied.as_ref()
    }

    /// Access the underlying timer
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Give the timer peripheral back
    pub fn release(self) -> T {
        self.timer
    }

    /// Program the full configuration
    ///
    /// Idempotent: re-applying an identical config rewrites the same values.
    /// If only the compare values changed since the last apply, the time
    /// base (clock enable, prescaler, period) is left untouched so the
    /// running counter keeps its phase.
    pub fn apply(
        &mut self,
        config: &TimerConfig,
        channels: &[ChannelSpec],
    ) -> Result<(), ApplyError<T::Error>> {
        if channels.len() != config.compares.len()
            || channels.len() > self.timer.channel_count()
        {
            return Err(ConfigError::ChannelMismatch.into());
        }
        config.validate(self.timer.max_register_value())?;

        let time_base_unchanged = self
            .applied
            .as_ref()
            .is_some_and(|prev| prev.prescaler == config.prescaler && prev.period == config.period);

        if !time_base_unchanged {
            self.timer.enable_clock().map_err(ApplyError::Hardware)?;
            self.timer
                .set_prescaler(config.prescaler)
                .map_err(ApplyError::Hardware)?;
            self.timer
                .set_period(config.period)
                .map_err(ApplyError::Hardware)?;
            self.timer
                .enable_period_preload()
                .map_err(ApplyError::Hardware)?;
        }

        for (channel, &compare) in config.compares.iter().enumerate() {
            self.timer
                .set_channel_compare(channel, compare)
                .map_err(ApplyError::Hardware)?;
            self.timer
                .enable_channel_preload(channel)
                .map_err(ApplyError::Hardware)?;
        }

        // Every value is written and preload-armed; outputs may connect now
        for (channel, spec) in channels.iter().enumerate() {
            self.timer
                .set_channel_output_enabled(channel, spec.enabled)
                .map_err(ApplyError::Hardware)?;
        }

        self.applied = Some(config.clone());
        Ok(())
    }

    /// Rewrite compare registers only, from new duty-cycle fractions
    ///
    /// Prescaler and period are untouched, so the counter's phase is
    /// preserved. All compares are derived and range-checked before the
    /// first register write; an invalid duty rewrites nothing.
    pub fn set_duty_cycles(&mut self, duty_cycles: &[f32]) -> Result<(), ApplyError<T::Error>> {
        let (period, channel_count) = match &self.applied {
            Some(config) => (config.period, config.compares.len()),
            None => return Err(ApplyError::NotConfigured),
        };
        if duty_cycles.len() != channel_count {
            return Err(ConfigError::ChannelMismatch.into());
        }

        let mut compares: Vec<u32, MAX_CHANNELS> = Vec::new();
        for &duty in duty_cycles {
            compares
                .push(compute_compare(period, duty)?)
                .map_err(|_| ConfigError::ChannelMismatch)?;
        }

        for (channel, &compare) in compares.iter().enumerate() {
            self.timer
                .set_channel_compare(channel, compare)
                .map_err(ApplyError::Hardware)?;
        }

        if let Some(config) = self.applied.as_mut() {
            config.compares = compares;
        }
        Ok(())
    }

    /// Connect or disconnect one channel's output without recomputation
    pub fn set_channel_enabled(
        &mut self,
        channel: usize,
        enabled: bool,
    ) -> Result<(), ApplyError<T::Error>> {
        let channel_count = match &self.applied {
            Some(config) => config.compares.len(),
            None => return Err(ApplyError::NotConfigured),
        };
        if channel >= channel_count {
            return Err(ConfigError::ChannelMismatch.into());
        }

        self.timer
            .set_channel_output_enabled(channel, enabled)
            .map_err(ApplyError::Hardware)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shadow the heapless Vec from the glob; the log can grow freely
    use std::vec::Vec;

    /// One recorded register access, in write order
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum RegWrite {
        ClockEnable,
        Prescaler(u32),
        Period(u32),
        PeriodPreload,
        Compare(usize, u32),
        ComparePreload(usize),
        OutputEnable(usize, bool),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Fault;

    /// Simulated 4-channel, 16-bit timer recording every register write
    struct MockTimer {
        clock_enabled: bool,
        fail_clock_enable: bool,
        prescaler: Option<u32>,
        period: Option<u32>,
        period_preload: bool,
        compare: [Option<u32>; 4],
        compare_preload: [bool; 4],
        output_enabled: [bool; 4],
        log: Vec<RegWrite>,
    }

    impl MockTimer {
        fn new() -> Self {
            Self {
                clock_enabled: false,
                fail_clock_enable: false,
                prescaler: None,
                period: None,
                period_preload: false,
                compare: [None; 4],
                compare_preload: [false; 4],
                output_enabled: [false; 4],
                log: Vec::new(),
            }
        }

        fn failing() -> Self {
            Self {
                fail_clock_enable: true,
                ..Self::new()
            }
        }

        /// Writes with the peripheral clock off are faults, as on hardware
        fn check_clock(&self) -> Result<(), Fault> {
            if self.clock_enabled {
                Ok(())
            } else {
                Err(Fault)
            }
        }

        fn snapshot(&self) -> ([Option<u32>; 4], Option<u32>, Option<u32>, [bool; 4]) {
            (self.compare, self.prescaler, self.period, self.output_enabled)
        }

        fn count<F: Fn(&RegWrite) -> bool>(&self, pred: F) -> usize {
            self.log.iter().filter(|w| pred(w)).count()
        }
    }

    impl PwmTimer for MockTimer {
        type Error = Fault;

        fn max_register_value(&self) -> u32 {
            65_535
        }

        fn channel_count(&self) -> usize {
            4
        }

        fn enable_clock(&mut self) -> Result<(), Fault> {
            if self.fail_clock_enable {
                return Err(Fault);
            }
            self.clock_enabled = true;
            self.log.push(RegWrite::ClockEnable);
            Ok(())
        }

        fn set_prescaler(&mut self, value: u32) -> Result<(), Fault> {
            self.check_clock()?;
            self.prescaler = Some(value);
            self.log.push(RegWrite::Prescaler(value));
            Ok(())
        }

        fn set_period(&mut self, value: u32) -> Result<(), Fault> {
            self.check_clock()?;
            self.period = Some(value);
            self.log.push(RegWrite::Period(value));
            Ok(())
        }

        fn enable_period_preload(&mut self) -> Result<(), Fault> {
            self.check_clock()?;
            self.period_preload = true;
            self.log.push(RegWrite::PeriodPreload);
            Ok(())
        }

        fn set_channel_compare(&mut self, channel: usize, value: u32) -> Result<(), Fault> {
            self.check_clock()?;
            self.compare[channel] = Some(value);
            self.log.push(RegWrite::Compare(channel, value));
            Ok(())
        }

        fn enable_channel_preload(&mut self, channel: usize) -> Result<(), Fault> {
            self.check_clock()?;
            self.compare_preload[channel] = true;
            self.log.push(RegWrite::ComparePreload(channel));
            Ok(())
        }

        fn set_channel_output_enabled(&mut self, channel: usize, enabled: bool) -> Result<(), Fault> {
            self.check_clock()?;
            self.output_enabled[channel] = enabled;
            self.log.push(RegWrite::OutputEnable(channel, enabled));
            Ok(())
        }
    }

    fn discovery_config() -> (TimerConfig, [ChannelSpec; 4]) {
        let channels = [ChannelSpec::disabled(0.5); 4];
        let config = TimerConfig::derive(84_000_000, 2_000, 1, &channels, 65_535).unwrap();
        (config, channels)
    }

    #[test]
    fn test_apply_programs_all_registers() {
        let (config, channels) = discovery_config();
        let mut engine = PwmEngine::new(MockTimer::new());

        engine.apply(&config, &channels).unwrap();

        let timer = engine.timer();
        assert!(timer.clock_enabled);
        assert_eq!(timer.prescaler, Some(41_999));
        assert_eq!(timer.period, Some(1_999));
        assert!(timer.period_preload);
        assert_eq!(timer.compare, [Some(1_000); 4]);
        assert_eq!(timer.compare_preload, [true; 4]);
        assert_eq!(timer.output_enabled, [false; 4]);
        assert!(engine.is_configured());
    }

    #[test]
    fn test_apply_respects_channel_enables() {
        let channels = [
            ChannelSpec::new(0.25),
            ChannelSpec::disabled(0.5),
            ChannelSpec::new(0.75),
            ChannelSpec::disabled(1.0),
        ];
        let config = TimerConfig::derive(84_000_000, 2_000, 1, &channels, 65_535).unwrap();
        let mut engine = PwmEngine::new(MockTimer::new());

        engine.apply(&config, &channels).unwrap();

        let timer = engine.timer();
        assert_eq!(timer.compare, [Some(500), Some(1_000), Some(1_499), Some(1_999)]);
        assert_eq!(timer.output_enabled, [true, false, true, false]);
    }

    #[test]
    fn test_outputs_enabled_after_all_values_written() {
        let channels = [ChannelSpec::new(0.5); 4];
        let config = TimerConfig::derive(84_000_000, 2_000, 1, &channels, 65_535).unwrap();
        let mut engine = PwmEngine::new(MockTimer::new());

        engine.apply(&config, &channels).unwrap();

        let log = &engine.timer().log;
        assert_eq!(log[0], RegWrite::ClockEnable);
        let first_enable = log
            .iter()
            .position(|w| matches!(w, RegWrite::OutputEnable(_, _)))
            .unwrap();
        let last_value = log
            .iter()
            .rposition(|w| !matches!(w, RegWrite::OutputEnable(_, _)))
            .unwrap();
        assert!(last_value < first_enable);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let (config, channels) = discovery_config();
        let mut engine = PwmEngine::new(MockTimer::new());

        engine.apply(&config, &channels).unwrap();
        let first = engine.timer().snapshot();

        engine.apply(&config, &channels).unwrap();
        assert_eq!(engine.timer().snapshot(), first);
    }

    #[test]
    fn test_reapply_with_same_time_base_skips_time_base_writes() {
        let (config, channels) = discovery_config();
        let mut engine = PwmEngine::new(MockTimer::new());
        engine.apply(&config, &channels).unwrap();

        let mut updated = config.clone();
        updated.compares.clear();
        for _ in 0..4 {
            updated.compares.push(500).unwrap();
        }
        engine.apply(&updated, &channels).unwrap();

        let timer = engine.timer();
        assert_eq!(timer.count(|w| matches!(w, RegWrite::Prescaler(_))), 1);
        assert_eq!(timer.count(|w| matches!(w, RegWrite::Period(_))), 1);
        assert_eq!(timer.compare, [Some(500); 4]);
    }

    #[test]
    fn test_duty_update_leaves_time_base_untouched() {
        let (config, channels) = discovery_config();
        let mut engine = PwmEngine::new(MockTimer::new());
        engine.apply(&config, &channels).unwrap();

        engine.set_duty_cycles(&[0.25, 0.25, 0.25, 0.25]).unwrap();

        let timer = engine.timer();
        assert_eq!(timer.count(|w| matches!(w, RegWrite::Prescaler(_))), 1);
        assert_eq!(timer.count(|w| matches!(w, RegWrite::Period(_))), 1);
        assert_eq!(timer.count(|w| matches!(w, RegWrite::ClockEnable)), 1);
        // round(1999 * 0.25) = 500
        assert_eq!(timer.compare, [Some(500); 4]);
        assert_eq!(engine.config().unwrap().compares.as_slice(), &[500; 4]);
    }

    #[test]
    fn test_duty_update_requires_configuration() {
        let mut engine = PwmEngine::new(MockTimer::new());
        assert_eq!(
            engine.set_duty_cycles(&[0.5]),
            Err(ApplyError::NotConfigured)
        );
    }

    #[test]
    fn test_invalid_duty_rewrites_nothing() {
        let (config, channels) = discovery_config();
        let mut engine = PwmEngine::new(MockTimer::new());
        engine.apply(&config, &channels).unwrap();
        let writes_before = engine.timer().log.len();

        let result = engine.set_duty_cycles(&[0.5, 2.0, 0.5, 0.5]);

        assert_eq!(result, Err(ApplyError::Config(ConfigError::InvalidDutyCycle)));
        assert_eq!(engine.timer().log.len(), writes_before);
        assert_eq!(engine.config().unwrap().compares.as_slice(), &[1_000; 4]);
    }

    #[test]
    fn test_hardware_fault_leaves_outputs_disabled() {
        let (config, mut channels) = discovery_config();
        for spec in &mut channels {
            spec.enabled = true;
        }
        let mut engine = PwmEngine::new(MockTimer::failing());

        let result = engine.apply(&config, &channels);

        assert_eq!(result, Err(ApplyError::Hardware(Fault)));
        assert_eq!(engine.timer().output_enabled, [false; 4]);
        assert!(!engine.is_configured());
    }

    #[test]
    fn test_apply_rejects_channel_mismatch() {
        let (config, _) = discovery_config();
        let mut engine = PwmEngine::new(MockTimer::new());

        // Config carries four compares, caller passes two specs
        let two = [ChannelSpec::new(0.5); 2];
        assert_eq!(
            engine.apply(&config, &two),
            Err(ApplyError::Config(ConfigError::ChannelMismatch))
        );
    }

    #[test]
    fn test_apply_rejects_more_channels_than_timer_has() {
        let channels = [ChannelSpec::new(0.5); 5];
        let config = TimerConfig::derive(84_000_000, 2_000, 1, &channels, 65_535).unwrap();
        let mut engine = PwmEngine::new(MockTimer::new());

        assert_eq!(
            engine.apply(&config, &channels),
            Err(ApplyError::Config(ConfigError::ChannelMismatch))
        );
    }

    #[test]
    fn test_apply_rejects_oversized_config() {
        // Hand-built config for a 32-bit timer, applied to a 16-bit one
        let config = TimerConfig {
            prescaler: 70_000,
            period: 1_999,
            compares: heapless::Vec::new(),
        };
        let mut engine = PwmEngine::new(MockTimer::new());

        assert_eq!(
            engine.apply(&config, &[]),
            Err(ApplyError::Config(ConfigError::PrescalerOverflow))
        );
    }

    #[test]
    fn test_set_channel_enabled() {
        let (config, channels) = discovery_config();
        let mut engine = PwmEngine::new(MockTimer::new());
        engine.apply(&config, &channels).unwrap();

        engine.set_channel_enabled(2, true).unwrap();
        assert_eq!(engine.timer().output_enabled, [false, false, true, false]);

        engine.set_channel_enabled(2, false).unwrap();
        assert_eq!(engine.timer().output_enabled, [false; 4]);

        assert_eq!(
            engine.set_channel_enabled(4, true),
            Err(ApplyError::Config(ConfigError::ChannelMismatch))
        );
    }

    #[test]
    fn test_set_channel_enabled_requires_configuration() {
        let mut engine = PwmEngine::new(MockTimer::new());
        assert_eq!(
            engine.set_channel_enabled(0, true),
            Err(ApplyError::NotConfigured)
        );
    }
}
