//! Per-tick stepping of arpeggio voices.
//!
//! Driven once per frame with a monotonic timestamp. For each channel the
//! gate-release check runs first and independently of the next-step check;
//! both compare with `>=` so a tick landing exactly on a boundary fires.
//! A `None` step timer means a fresh window: the first step sounds
//! immediately on entering Playing.

use crate::channel::{ArpChannel, ArpMode, SoundingNote, MIN_GATE};
use crate::sink::{MidiSink, NoteMessage};
use std::time::{Duration, Instant};
use tracing::warn;

/// Sends best-effort: a failed send is logged and the caller's bookkeeping
/// advances anyway, so the engine never believes a note it tried to release
/// is still sounding.
pub(crate) fn send_or_warn<S: MidiSink>(sink: &mut S, message: NoteMessage) {
    if let Err(err) = sink.send(message) {
        warn!("MIDI send failed (not retried): {err}");
    }
}

/// Advances the LCG and returns a uniform index in [0, len).
pub(crate) fn next_random_index(state: &mut u64, len: usize) -> usize {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    ((*state >> 33) as usize) % len
}

/// Advances one channel by one tick: release the sounding note once its
/// gate window has elapsed, then sound the next step once the step interval
/// has elapsed.
pub(crate) fn tick_channel<S: MidiSink>(
    channel: &mut ArpChannel,
    now: Instant,
    step_interval: Duration,
    rng_state: &mut u64,
    sink: &mut S,
) {
    if channel.notes.is_empty() {
        // Nothing to arpeggiate; release whatever is still sounding.
        if let Some(sounding) = channel.take_sounding() {
            send_or_warn(sink, NoteMessage::note_off(channel.output_channel(), sounding.note));
        }
        channel.reset_step_timer();
        return;
    }

    let view = channel.step_view();
    if channel.cursor >= view.len() {
        // A concurrent edit shortened the sequence under the cursor.
        channel.cursor = 0;
    }

    // Gate math happens in f32 milliseconds: 500.0 * 0.4 is exactly 200.0
    // there, while nanosecond-precision arithmetic lands a few ns past the
    // boundary and a tick at exactly 200ms would miss the release.
    let step_ms = step_interval.as_secs_f32() * 1000.0;
    let gate_ms = step_ms * channel.gate().clamp(MIN_GATE, 1.0);
    if let Some(sounding) = channel.sounding {
        let elapsed_ms = now.duration_since(sounding.started).as_secs_f32() * 1000.0;
        if elapsed_ms >= gate_ms {
            send_or_warn(sink, NoteMessage::note_off(channel.output_channel(), sounding.note));
            channel.sounding = None;
        }
    }

    let step_due = match channel.last_step {
        None => true,
        Some(last) => now.duration_since(last) >= step_interval,
    };
    if step_due {
        let note = view[channel.cursor];
        send_or_warn(
            sink,
            NoteMessage::note_on(channel.output_channel(), note, channel.velocity()),
        );
        channel.sounding = Some(SoundingNote { note, started: now });
        channel.last_step = Some(now);
        advance_cursor(channel, view.len(), rng_state);
    }
}

fn advance_cursor(channel: &mut ArpChannel, len: usize, rng_state: &mut u64) {
    match channel.mode() {
        ArpMode::Up | ArpMode::InsertionOrder => {
            channel.cursor = (channel.cursor + 1) % len;
        }
        ArpMode::Down => {
            channel.cursor = if channel.cursor == 0 {
                len - 1
            } else {
                channel.cursor - 1
            };
        }
        ArpMode::PingPongInclusive => {
            // Boundary flips direction without moving, so each endpoint is
            // sounded twice in a row.
            if channel.direction < 0 && channel.cursor == 0 {
                channel.direction = 1;
            } else if channel.direction > 0 && channel.cursor + 1 >= len {
                channel.direction = -1;
            } else {
                channel.cursor = (channel.cursor as isize + channel.direction as isize) as usize;
            }
        }
        ArpMode::PingPongExclusive => {
            // Same boundary detection, but the cursor always moves by the
            // (possibly just-flipped) direction; endpoints never repeat.
            if channel.direction < 0 && channel.cursor == 0 {
                channel.direction = 1;
            } else if channel.direction > 0 && channel.cursor + 1 >= len {
                channel.direction = -1;
            }
            let next = channel.cursor as isize + channel.direction as isize;
            channel.cursor = next.clamp(0, len as isize - 1) as usize;
        }
        ArpMode::Random => {
            channel.cursor = next_random_index(rng_state, len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelId;
    use crate::sink::BufferSink;

    const STEP: Duration = Duration::from_millis(500); // 120 BPM

    fn channel_with_notes(mode: ArpMode, notes: &[u8]) -> ArpChannel {
        let mut ch = ArpChannel::new(ChannelId(0), "test".to_string(), 3);
        ch.set_mode(mode);
        for &n in notes {
            ch.record_note(n);
        }
        ch
    }

    /// Runs `steps` forced steps and returns the sequence of note-on pitches.
    fn collect_steps(ch: &mut ArpChannel, steps: usize) -> Vec<u8> {
        let mut sink = BufferSink::new();
        let mut rng = 1u64;
        let t0 = Instant::now();
        for i in 0..steps {
            // One tick per full interval so every tick steps
            tick_channel(ch, t0 + STEP * i as u32, STEP, &mut rng, &mut sink);
        }
        sink.messages()
            .iter()
            .filter(|m| m.is_note_on())
            .map(|m| m.note)
            .collect()
    }

    #[test]
    fn test_up_mode_wraps() {
        let mut ch = channel_with_notes(ArpMode::Up, &[67, 60, 64]);
        // Sorted view [60, 64, 67], cursor walks 0,1,2,0,...
        assert_eq!(collect_steps(&mut ch, 5), vec![60, 64, 67, 60, 64]);
    }

    #[test]
    fn test_down_mode_wraps_backwards() {
        let mut ch = channel_with_notes(ArpMode::Down, &[60, 64, 67]);
        // First step plays cursor 0, then wraps to the top
        assert_eq!(collect_steps(&mut ch, 5), vec![60, 67, 64, 60, 67]);
    }

    #[test]
    fn test_insertion_order_uses_capture_order() {
        let mut ch = channel_with_notes(ArpMode::InsertionOrder, &[67, 60, 64]);
        assert_eq!(collect_steps(&mut ch, 4), vec![67, 60, 64, 67]);
    }

    #[test]
    fn test_ping_pong_inclusive_repeats_endpoints() {
        let mut ch = channel_with_notes(ArpMode::PingPongInclusive, &[60, 64, 67]);
        assert_eq!(
            collect_steps(&mut ch, 9),
            vec![60, 64, 67, 67, 64, 60, 60, 64, 67]
        );
    }

    #[test]
    fn test_ping_pong_exclusive_never_repeats_endpoints() {
        let mut ch = channel_with_notes(ArpMode::PingPongExclusive, &[60, 64, 67]);
        assert_eq!(
            collect_steps(&mut ch, 8),
            vec![60, 64, 67, 64, 60, 64, 67, 64]
        );
    }

    #[test]
    fn test_ping_pong_exclusive_single_note_does_not_underflow() {
        let mut ch = channel_with_notes(ArpMode::PingPongExclusive, &[60]);
        assert_eq!(collect_steps(&mut ch, 3), vec![60, 60, 60]);
    }

    #[test]
    fn test_random_single_note_reselects_sole_index() {
        let mut ch = channel_with_notes(ArpMode::Random, &[60]);
        assert_eq!(collect_steps(&mut ch, 4), vec![60, 60, 60, 60]);
    }

    #[test]
    fn test_random_stays_in_range() {
        let mut ch = channel_with_notes(ArpMode::Random, &[60, 64, 67, 72]);
        let played = collect_steps(&mut ch, 32);
        assert_eq!(played.len(), 32);
        assert!(played.iter().all(|n| [60, 64, 67, 72].contains(n)));
    }

    #[test]
    fn test_gate_release_before_next_step() {
        // 120 BPM, gate 0.4: note-off at 200ms, next note-on at 500ms
        let mut ch = channel_with_notes(ArpMode::Up, &[60, 64, 67]);
        ch.set_gate(0.4);
        let mut sink = BufferSink::new();
        let mut rng = 1u64;
        let t0 = Instant::now();

        tick_channel(&mut ch, t0, STEP, &mut rng, &mut sink);
        assert_eq!(sink.drain(), vec![NoteMessage::note_on(3, 60, 100)]);

        // Mid-gate tick: nothing happens
        tick_channel(&mut ch, t0 + Duration::from_millis(100), STEP, &mut rng, &mut sink);
        assert!(sink.messages().is_empty());

        // Exactly at the gate boundary: note-off only
        tick_channel(&mut ch, t0 + Duration::from_millis(200), STEP, &mut rng, &mut sink);
        assert_eq!(sink.drain(), vec![NoteMessage::note_off(3, 60)]);

        // Exactly at the step boundary: next note-on, cursor now at 2
        tick_channel(&mut ch, t0 + Duration::from_millis(500), STEP, &mut rng, &mut sink);
        assert_eq!(sink.drain(), vec![NoteMessage::note_on(3, 64, 100)]);
        assert_eq!(ch.cursor, 2);
    }

    #[test]
    fn test_gate_release_fires_at_exact_millisecond_boundary() {
        // 100 BPM: step 600ms, gate 0.4 puts the release at exactly 240ms.
        // The window must not drift a few nanoseconds past the boundary.
        let step = Duration::from_millis(600);
        let mut ch = channel_with_notes(ArpMode::Up, &[60, 64]);
        ch.set_gate(0.4);
        let mut sink = BufferSink::new();
        let mut rng = 1u64;
        let t0 = Instant::now();

        tick_channel(&mut ch, t0, step, &mut rng, &mut sink);
        sink.clear();

        tick_channel(&mut ch, t0 + Duration::from_millis(240), step, &mut rng, &mut sink);
        assert_eq!(sink.drain(), vec![NoteMessage::note_off(3, 60)]);
    }

    #[test]
    fn test_long_gap_releases_and_steps_in_one_tick() {
        let mut ch = channel_with_notes(ArpMode::Up, &[60, 64]);
        let mut sink = BufferSink::new();
        let mut rng = 1u64;
        let t0 = Instant::now();

        tick_channel(&mut ch, t0, STEP, &mut rng, &mut sink);
        sink.clear();

        // A wall-clock jump past both windows: release then step, same tick
        tick_channel(&mut ch, t0 + Duration::from_secs(10), STEP, &mut rng, &mut sink);
        assert_eq!(
            sink.messages(),
            &[NoteMessage::note_off(3, 60), NoteMessage::note_on(3, 64, 100)]
        );
    }

    #[test]
    fn test_cursor_clamped_after_concurrent_shrink() {
        let mut ch = channel_with_notes(ArpMode::Up, &[60, 64, 67]);
        ch.cursor = 2;
        ch.notes.truncate(1);

        let mut sink = BufferSink::new();
        let mut rng = 1u64;
        tick_channel(&mut ch, Instant::now(), STEP, &mut rng, &mut sink);
        assert_eq!(sink.messages(), &[NoteMessage::note_on(3, 60, 100)]);
    }

    #[test]
    fn test_empty_sequence_releases_leftover_sounding() {
        let mut ch = channel_with_notes(ArpMode::Up, &[60]);
        let mut sink = BufferSink::new();
        let mut rng = 1u64;
        let t0 = Instant::now();

        tick_channel(&mut ch, t0, STEP, &mut rng, &mut sink);
        sink.clear();

        ch.notes.clear();
        tick_channel(&mut ch, t0 + Duration::from_millis(1), STEP, &mut rng, &mut sink);
        assert_eq!(sink.messages(), &[NoteMessage::note_off(3, 60)]);
        assert!(ch.sounding.is_none());
    }
}
