//! Audio feedback
//!
//! Procedurally generated cues using the Web Audio API - no sound files.
//! Off the browser every sink is silent.

use crate::sim::{Cue, Effect};

/// Fire-and-forget cue player
pub trait FeedbackSink {
    fn play(&mut self, cue: Cue);

    /// Play every feedback cue in `effects`, skipping other effects
    fn play_effects(&mut self, effects: &[Effect]) {
        for effect in effects {
            if let Effect::Feedback(cue) = effect {
                self.play(*cue);
            }
        }
    }
}

/// Sink that drops every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl FeedbackSink for SilentSink {
    fn play(&mut self, _cue: Cue) {}
}

/// Catch tone pitch: higher for more valuable items
pub fn catch_frequency(points: i32) -> f32 {
    400.0 + points.clamp(0, 1000) as f32 / 2.0
}

/// One arpeggio note; times are seconds from the cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub freq: f32,
    pub start: f64,
    /// Linear rise from silence to `peak`
    pub attack: f64,
    pub peak: f32,
    pub decay_end: f64,
    pub stop: f64,
}

/// Victory arpeggio: A4, C#5, E5, A5 a tenth of a second apart
pub fn victory_notes(vol: f32) -> Vec<Note> {
    [440.0, 554.37, 659.25, 880.0]
        .iter()
        .enumerate()
        .map(|(i, &freq)| Note {
            freq,
            start: i as f64 * 0.1,
            attack: 0.05,
            peak: vol * 0.2,
            decay_end: 0.5,
            stop: 0.6,
        })
        .collect()
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{FeedbackSink, catch_frequency, victory_notes};
    use crate::settings::Settings;
    use crate::sim::Cue;

    /// Audio manager for the game
    ///
    /// The context is created on the first cue, which always follows a user
    /// gesture, so the browser lets it start.
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        failed: bool,
        settings: Settings,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            Self {
                ctx: None,
                failed: false,
                settings: settings.clone(),
            }
        }

        /// Create the context on first use and resume it if suspended
        fn context(&mut self) -> Option<&AudioContext> {
            if self.ctx.is_none() && !self.failed {
                match AudioContext::new() {
                    Ok(ctx) => self.ctx = Some(ctx),
                    Err(_) => {
                        log::warn!("Failed to create AudioContext - audio disabled");
                        self.failed = true;
                    }
                }
            }
            let ctx = self.ctx.as_ref()?;
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Some(ctx)
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single decaying tone starting `delay` seconds from now
        fn tone(ctx: &AudioContext, freq: f32, osc_type: OscillatorType, duration: f64, volume: f32, delay: f64) {
            let Some((osc, gain)) = Self::create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;
            gain.gain().set_value_at_time(volume, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.0001, t + duration)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + duration).ok();
        }

        /// Gift caught - bright ping, two-note shimmer for bonuses
        fn play_catch(ctx: &AudioContext, vol: f32, points: i32, is_bonus: bool) {
            let freq = catch_frequency(points);
            if is_bonus {
                Self::tone(ctx, freq, OscillatorType::Triangle, 0.4, vol * 0.2, 0.0);
                Self::tone(ctx, freq * 1.5, OscillatorType::Triangle, 0.6, vol * 0.1, 0.0);
            } else {
                Self::tone(ctx, freq, OscillatorType::Sine, 0.2, vol * 0.2, 0.0);
            }
        }

        /// Hazard caught - harsh buzz
        fn play_hazard(ctx: &AudioContext, vol: f32) {
            Self::tone(ctx, 150.0, OscillatorType::Sawtooth, 0.3, vol * 0.15, 0.0);
            Self::tone(ctx, 110.0, OscillatorType::Square, 0.4, vol * 0.1, 0.0);
        }

        /// Level won - rising arpeggio
        fn play_victory(ctx: &AudioContext, vol: f32) {
            let now = ctx.current_time();
            for note in victory_notes(vol) {
                let Some((osc, gain)) = Self::create_osc(ctx, note.freq, OscillatorType::Sine) else {
                    continue;
                };
                let t = now + note.start;
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(note.peak, t + note.attack)
                    .ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.0001, t + note.decay_end)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + note.stop).ok();
            }
        }

        /// Gift box opened - scattered sparkles
        fn play_box_open(ctx: &AudioContext, vol: f32) {
            for _ in 0..10 {
                let freq = 800.0 + js_sys::Math::random() as f32 * 2000.0;
                let duration = 0.5 + js_sys::Math::random();
                Self::tone(ctx, freq, OscillatorType::Sine, duration, vol * 0.05, 0.0);
            }
        }
    }

    impl FeedbackSink for AudioManager {
        fn play(&mut self, cue: Cue) {
            let vol = self.settings.effective_volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = self.context() else { return };

            match cue {
                Cue::Catch { points, is_bonus } => Self::play_catch(ctx, vol, points, is_bonus),
                Cue::Hazard => Self::play_hazard(ctx, vol),
                Cue::Victory => Self::play_victory(ctx, vol),
                Cue::BoxOpen => Self::play_box_open(ctx, vol),
            }
        }
    }
}
