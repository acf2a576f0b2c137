/// Sound engine: procedural pad tones via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Exactly one sink plays at a time: a cutting effect stops and releases
/// the sink of the one before it. The new-record chime is the exception:
/// it is queued on the playing sink so the final pad tone of the round
/// is still heard in full.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

use crate::domain::pad::Pad;
use crate::sim::event::Presenter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Pad(Pad),
    Defeat,
    Record,
}

/// How a new effect treats the one already playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entry {
    /// Stop the playing effect, start this one now.
    Cut,
    /// Play once the current effect has finished.
    AfterCurrent,
}

pub trait EffectPlayer {
    fn trigger(&mut self, effect: Effect, entry: Entry);
}

/// Presenter that turns game events into sound effects.
pub struct SoundCues<'a, P: EffectPlayer>(pub &'a mut P);

impl<P: EffectPlayer> Presenter for SoundCues<'_, P> {
    fn on_move_start(&mut self, pad: Pad, _index: usize) {
        self.0.trigger(Effect::Pad(pad), Entry::Cut);
    }

    fn on_feedback(&mut self, pad: Pad, defeat: bool) {
        let effect = if defeat { Effect::Defeat } else { Effect::Pad(pad) };
        self.0.trigger(effect, Entry::Cut);
    }

    fn on_new_record(&mut self, _value: u32) {
        self.0.trigger(Effect::Record, Entry::AfterCurrent);
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use crate::domain::pad::Pad;
    use super::{Effect, EffectPlayer, Entry};

    const SAMPLE_RATE: u32 = 22050;

    /// Pad tones, lowest on blue, in `Pad::ALL` order.
    const PAD_FREQS: [f32; Pad::COUNT] = [209.0, 252.0, 310.0, 415.0];
    const PAD_TONE_SECS: f32 = 0.3;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        current: Option<Sink>,
        sfx_pads: [Arc<Vec<u8>>; Pad::COUNT],
        sfx_defeat: Arc<Vec<u8>>,
        sfx_record: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::info!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            let sfx_pads = PAD_FREQS.map(|f| Arc::new(make_wav(&gen_pad(f))));
            let sfx_defeat = Arc::new(make_wav(&gen_defeat()));
            let sfx_record = Arc::new(make_wav(&gen_record()));

            Some(SoundEngine {
                _stream: stream,
                handle,
                current: None,
                sfx_pads,
                sfx_defeat,
                sfx_record,
            })
        }

        fn decode(buf: &Arc<Vec<u8>>) -> Option<Decoder<Cursor<Vec<u8>>>> {
            match Decoder::new(Cursor::new(buf.as_ref().clone())) {
                Ok(src) => Some(src),
                Err(e) => {
                    log::debug!("could not decode effect: {e}");
                    None
                }
            }
        }

        fn play(&mut self, buf: &Arc<Vec<u8>>) {
            if let Some(old) = self.current.take() {
                old.stop();
            }
            let sink = match Sink::try_new(&self.handle) {
                Ok(sink) => sink,
                Err(e) => {
                    log::debug!("sink unavailable: {e}");
                    return;
                }
            };
            if let Some(src) = Self::decode(buf) {
                sink.append(src);
                self.current = Some(sink);
            }
        }

        fn enqueue(&mut self, buf: &Arc<Vec<u8>>) {
            let busy = self.current.as_ref().is_some_and(|sink| !sink.empty());
            if !busy {
                self.play(buf);
                return;
            }
            if let (Some(sink), Some(src)) = (&self.current, Self::decode(buf)) {
                sink.append(src);
            }
        }
    }

    impl EffectPlayer for SoundEngine {
        fn trigger(&mut self, effect: Effect, entry: Entry) {
            let buf = match effect {
                Effect::Pad(pad) => Arc::clone(&self.sfx_pads[pad.index()]),
                Effect::Defeat => Arc::clone(&self.sfx_defeat),
                Effect::Record => Arc::clone(&self.sfx_record),
            };
            match entry {
                Entry::Cut => self.play(&buf),
                Entry::AfterCurrent => self.enqueue(&buf),
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Pad tone: soft square-ish wave with a short attack and release.
    fn gen_pad(freq: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * PAD_TONE_SECS) as usize;
        let attack = n / 30;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = if i < attack {
                    i as f32 / attack as f32
                } else {
                    1.0 - ((i - attack) as f32 / (n - attack) as f32).powf(2.0)
                };
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.8
                    + (t * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.2;
                wave * env * 0.3
            })
            .collect()
    }

    /// Defeat: low buzzing tone sliding down.
    fn gen_defeat() -> Vec<f32> {
        let duration = 0.7;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 110.0 - t * 40.0;
                phase += freq / SAMPLE_RATE as f32;
                // Sawtooth
                let saw = 2.0 * (phase - phase.floor()) - 1.0;
                let env = (1.0 - t).powf(0.7);
                saw * env * 0.25
            })
            .collect()
    }

    /// New record: ascending arpeggio through the four pad tones.
    fn gen_record() -> Vec<f32> {
        let note_dur = 0.08;
        let mut samples = Vec::new();
        for &freq in PAD_FREQS.iter().chain(std::iter::once(&(PAD_FREQS[3] * 2.0))) {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.4;
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin();
                samples.push(wave * env * 0.3);
            }
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
}

#[cfg(not(feature = "sound"))]
impl EffectPlayer for SoundEngine {
    fn trigger(&mut self, _effect: Effect, _entry: Entry) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::event::{present, GameEvent};

    #[derive(Default)]
    struct Recorder(Vec<(Effect, Entry)>);

    impl EffectPlayer for Recorder {
        fn trigger(&mut self, effect: Effect, entry: Entry) {
            self.0.push((effect, entry));
        }
    }

    fn cues(events: &[GameEvent]) -> Vec<(Effect, Entry)> {
        let mut rec = Recorder::default();
        present(&mut SoundCues(&mut rec), events);
        rec.0
    }

    #[test]
    fn record_chime_waits_for_final_pad_tone() {
        let played = cues(&[
            GameEvent::Feedback { pad: Pad::Yellow, defeat: false },
            GameEvent::NewRecord { value: 4 },
            GameEvent::RoundComplete { length: 4 },
        ]);
        assert_eq!(played, vec![
            (Effect::Pad(Pad::Yellow), Entry::Cut),
            (Effect::Record, Entry::AfterCurrent),
        ]);
    }

    #[test]
    fn playback_and_defeat_cut_the_previous_effect() {
        let played = cues(&[
            GameEvent::MoveStart { pad: Pad::Blue, index: 0 },
            GameEvent::Feedback { pad: Pad::Red, defeat: true },
            GameEvent::Defeat { completed: 0 },
        ]);
        assert_eq!(played, vec![
            (Effect::Pad(Pad::Blue), Entry::Cut),
            (Effect::Defeat, Entry::Cut),
        ]);
    }
}
