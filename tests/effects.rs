mod tests {
    use core::f32::consts::{FRAC_PI_2, PI, TAU};

    use dmx_stage_composer::config::EffectTimings;
    use dmx_stage_composer::effect::intensity_at;
    use dmx_stage_composer::{
        ConcurrencyPolicy, ControllerConfig, Duration, EffectEngine, EffectId, Instant, Lifecycle,
    };

    const FRAME_MS: u64 = 30;

    fn config(policy: ConcurrencyPolicy) -> ControllerConfig {
        ControllerConfig {
            effects: EffectTimings {
                wave: Duration::from_millis(90),
                chaser: Duration::from_millis(210),
                breath: Duration::from_millis(30),
                fade: Duration::from_millis(30),
            },
            policy,
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_wave_lights_exactly_one_channel() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [33u8, 0, 77, 5];
        engine.activate(EffectId::Wave, at(0));

        for tick in 0..40 {
            engine.update(at(tick * FRAME_MS), &mut channels);
            let lit = channels.iter().filter(|value| **value == 255).count();
            let dark = channels.iter().filter(|value| **value == 0).count();
            assert_eq!(lit, 1, "tick {tick}: {channels:?}");
            assert_eq!(dark, 3, "tick {tick}: {channels:?}");
        }
    }

    #[test]
    fn test_wave_advances_once_per_interval_and_wraps() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [0u8; 4];
        engine.activate(EffectId::Wave, at(0));

        engine.update(at(0), &mut channels);
        assert_eq!(engine.wave().lit(), Some(0));
        assert_eq!(channels, [255, 0, 0, 0]);

        engine.update(at(30), &mut channels);
        engine.update(at(60), &mut channels);
        assert_eq!(engine.wave().lit(), Some(0));

        let mut expected = 0;
        for step in 1..=9u64 {
            engine.update(at(step * 90), &mut channels);
            expected = (expected + 1) % 4;
            assert_eq!(engine.wave().lit(), Some(expected));
            assert_eq!(channels[expected], 255);
        }
    }

    #[test]
    fn test_chaser_levels_track_accumulators() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [0u8; 4];
        engine.activate(EffectId::Chaser, at(0));

        let mut previous_position = 0;
        let mut advances = 0;
        for tick in 0..100 {
            engine.update(at(tick * FRAME_MS), &mut channels);
            let chaser = engine.chaser();
            for (channel, level) in channels.iter().zip(chaser.levels()) {
                assert!((0.0..=255.0).contains(level));
                assert_eq!(*channel, *level as u8);
            }
            if chaser.position() != previous_position {
                assert_eq!(chaser.position(), (previous_position + 1) % 4);
                previous_position = chaser.position();
                advances += 1;
            }
        }
        // 3 s of frames with a 210 ms step interval
        assert_eq!(advances, 14);
    }

    #[test]
    fn test_chaser_rises_and_falls_by_step() {
        let mut engine = EffectEngine::<2>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [0u8, 100];
        engine.activate(EffectId::Chaser, at(0));

        engine.update(at(0), &mut channels);
        assert_eq!(channels, [15, 0]);
        for tick in 1..20 {
            engine.update(at(tick * 10), &mut channels);
        }
        // Capped at full before the first step
        assert_eq!(channels, [255, 0]);
    }

    #[test]
    fn test_breath_intensity_bounds() {
        for (min, max) in [(0u8, 255u8), (10, 200), (50, 50)] {
            let mut phase = 0.0f32;
            while phase < TAU {
                let value = intensity_at(phase, min, max);
                assert!(value >= min && value <= max, "{phase} -> {value}");
                phase += 0.01;
            }
            assert!(intensity_at(FRAC_PI_2, min, max) >= max.saturating_sub(1));
            assert!(intensity_at(3.0 * FRAC_PI_2, min, max) <= min.saturating_add(1));
        }
        assert!((126..=127).contains(&intensity_at(PI, 0, 254)));
    }

    #[test]
    fn test_breath_touches_members_only() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [9u8; 4];
        engine.breath_mut().set_members(&[2, 4, 17]);
        engine.breath_mut().set_increment(FRAC_PI_2);
        engine.activate(EffectId::Breath, at(0));

        engine.update(at(0), &mut channels);
        assert!(channels[1] >= 254);
        assert_eq!(channels[1], channels[3]);
        assert_eq!(channels[0], 9);
        assert_eq!(channels[2], 9);
        assert_eq!(engine.breath().members(), &[false, true, false, true]);
    }

    #[test]
    fn test_breath_phase_wraps() {
        let mut engine = EffectEngine::<1>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [0u8];
        engine.breath_mut().set_increment(1.0);
        engine.activate(EffectId::Breath, at(0));
        for tick in 0..50 {
            engine.update(at(tick * FRAME_MS), &mut channels);
            let phase = engine.breath().phase();
            assert!((0.0..TAU).contains(&phase));
        }
    }

    #[test]
    fn test_breath_bounds_are_ordered() {
        let mut engine = EffectEngine::<1>::new(&config(ConcurrencyPolicy::Layered));
        let breath = engine.breath_mut();
        assert!(breath.set_max(100));
        assert!(!breath.set_min(150));
        assert!(breath.set_min(40));
        assert!(!breath.set_max(20));
        assert_eq!(breath.bounds(), (40, 100));
    }

    #[test]
    fn test_fade_is_monotonic_and_bounded() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [0u8; 4];
        engine.activate(EffectId::Wave, at(0));
        engine.update(at(0), &mut channels);
        channels[2] = 130;

        assert_eq!(engine.toggle(EffectId::Wave, at(0)), Lifecycle::Fading);

        let mut fade_ticks = 0;
        let mut previous = channels;
        let mut now = 0;
        while engine.state(EffectId::Wave) == Lifecycle::Fading {
            now += FRAME_MS;
            engine.update(at(now), &mut channels);
            fade_ticks += 1;
            for (before, after) in previous.iter().zip(channels.iter()) {
                assert!(after <= before);
            }
            previous = channels;
            assert!(fade_ticks <= 17, "fade did not finish: {channels:?}");
        }
        // Only the wave's own channel fades, the direct write stays
        assert_eq!(channels, [0, 0, 130, 0]);
        assert_eq!(fade_ticks, 17);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_chaser_fade_reaches_inactive() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [0u8; 4];
        engine.activate(EffectId::Chaser, at(0));
        let mut now = 0;
        for _ in 0..10 {
            engine.update(at(now), &mut channels);
            now += FRAME_MS;
        }
        assert!(channels.iter().any(|value| *value > 0));

        engine.deactivate(EffectId::Chaser, at(now));
        let mut previous = channels;
        let mut fade_ticks = 0;
        while engine.state(EffectId::Chaser) == Lifecycle::Fading {
            now += FRAME_MS;
            engine.update(at(now), &mut channels);
            fade_ticks += 1;
            for (before, after) in previous.iter().zip(channels.iter()) {
                assert!(after <= before, "{previous:?} -> {channels:?}");
            }
            previous = channels;
            assert!(fade_ticks <= 17, "fade did not finish: {channels:?}");
        }
        assert_eq!(engine.state(EffectId::Chaser), Lifecycle::Inactive);
        assert_eq!(engine.chaser().levels(), &[0.0; 4]);
        assert_eq!(channels, [0; 4]);
    }

    #[test]
    fn test_breath_fade_members_only() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [40u8; 4];
        engine.breath_mut().set_members(&[1, 3]);
        engine.breath_mut().set_increment(FRAC_PI_2);
        engine.activate(EffectId::Breath, at(0));
        engine.update(at(0), &mut channels);
        assert!(channels[0] >= 254);

        engine.deactivate(EffectId::Breath, at(0));
        let mut previous = channels;
        let mut fade_ticks = 0;
        let mut now = 0;
        while engine.state(EffectId::Breath) == Lifecycle::Fading {
            now += FRAME_MS;
            engine.update(at(now), &mut channels);
            fade_ticks += 1;
            assert!(channels[0] <= previous[0]);
            assert!(channels[2] <= previous[2]);
            assert_eq!(channels[0], channels[2]);
            assert_eq!((channels[1], channels[3]), (40, 40));
            previous = channels;
            assert!(fade_ticks <= 17, "fade did not finish: {channels:?}");
        }
        assert_eq!(channels, [0, 40, 0, 40]);
    }

    #[test]
    fn test_fade_ends_while_later_effect_writes() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [0u8; 4];
        engine.activate(EffectId::Wave, at(0));
        engine.update(at(0), &mut channels);
        engine.activate(EffectId::Breath, at(0));
        engine.deactivate(EffectId::Wave, at(0));

        let mut now = 0;
        let mut fade_ticks = 0;
        while engine.state(EffectId::Wave) == Lifecycle::Fading {
            now += FRAME_MS;
            engine.update(at(now), &mut channels);
            fade_ticks += 1;
            let level = engine.breath().level();
            assert_eq!(channels, [level; 4]);
            assert!(fade_ticks <= 17);
        }
        assert_eq!(engine.state(EffectId::Breath), Lifecycle::Active);
    }

    #[test]
    fn test_fade_timers_are_independent() {
        let mut engine = EffectEngine::<2>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [0u8; 2];
        engine.activate(EffectId::Wave, at(0));
        engine.activate(EffectId::Chaser, at(0));
        for tick in 0..10 {
            engine.update(at(tick * 10), &mut channels);
        }
        let levels = *engine.chaser().levels();

        engine.deactivate(EffectId::Wave, at(100));
        engine.deactivate(EffectId::Chaser, at(115));

        engine.update(at(130), &mut channels);
        assert_eq!(engine.chaser().levels(), &levels);

        engine.update(at(145), &mut channels);
        assert_eq!(engine.chaser().levels()[0], levels[0] - 15.0);
    }

    #[test]
    fn test_layered_policy_later_effect_wins() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Layered));
        let mut channels = [0u8; 4];
        engine.activate(EffectId::Wave, at(0));
        engine.activate(EffectId::Chaser, at(0));
        assert_eq!(engine.state(EffectId::Wave), Lifecycle::Active);
        assert_eq!(engine.state(EffectId::Chaser), Lifecycle::Active);

        engine.update(at(0), &mut channels);
        assert_eq!(channels, [15, 0, 0, 0]);
    }

    #[test]
    fn test_exclusive_policy_fades_others() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Exclusive));
        engine.activate(EffectId::Wave, at(0));
        engine.activate(EffectId::Breath, at(0));
        engine.activate(EffectId::Chaser, at(10));
        assert_eq!(engine.state(EffectId::Wave), Lifecycle::Fading);
        assert_eq!(engine.state(EffectId::Breath), Lifecycle::Fading);
        assert_eq!(engine.state(EffectId::Chaser), Lifecycle::Active);
    }

    #[test]
    fn test_exclusive_switch_waits_for_fade() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Exclusive));
        let mut channels = [0u8; 4];
        engine.activate(EffectId::Breath, at(0));
        engine.update(at(0), &mut channels);
        assert!(channels.iter().all(|value| *value > 0));

        engine.activate(EffectId::Wave, at(30));
        assert_eq!(engine.state(EffectId::Breath), Lifecycle::Fading);

        let mut now = 30;
        let mut fade_ticks = 0;
        while engine.state(EffectId::Breath) == Lifecycle::Fading {
            now += FRAME_MS;
            engine.update(at(now), &mut channels);
            fade_ticks += 1;
            assert_eq!(engine.wave().lit(), None);
            assert!(fade_ticks <= 17, "fade did not finish: {channels:?}");
        }
        assert_eq!(channels, [0; 4]);

        for _ in 0..200 {
            now += FRAME_MS;
            engine.update(at(now), &mut channels);
            let lit = channels.iter().filter(|value| **value == 255).count();
            let dark = channels.iter().filter(|value| **value == 0).count();
            assert_eq!((lit, dark), (1, 3), "{channels:?}");
        }
        assert_eq!(engine.state(EffectId::Breath), Lifecycle::Inactive);
        assert_eq!(engine.state(EffectId::Wave), Lifecycle::Active);
    }

    #[test]
    fn test_toggle_from_fading_reactivates() {
        let mut engine = EffectEngine::<4>::new(&config(ConcurrencyPolicy::Layered));
        assert_eq!(engine.toggle(EffectId::Breath, at(0)), Lifecycle::Active);
        assert_eq!(engine.toggle(EffectId::Breath, at(30)), Lifecycle::Fading);
        assert_eq!(engine.toggle(EffectId::Breath, at(60)), Lifecycle::Active);
    }
}
