// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! (max,+) algebra over event sequences.
//!
//! An event sequence is an ordered list of timestamps; index `k` is the time
//! of the `k`-th token. "No event yet" is encoded by [`MINUS_INFINITY`], a
//! finite stand-in for −∞ that is small enough to lose every `max` against a
//! real timestamp. Code that needs to recognise the sentinel after delays
//! were added to it must go through [`is_minus_infinity`] rather than
//! comparing against the constant.
//!
//! All functions here are pure; they never mutate their inputs.

/// A point in time on the model's (unitless) time axis.
pub type Timestamp = f64;

/// An ordered event sequence. Order is significant: index = token index.
pub type Sequence = Vec<Timestamp>;

/// Finite representation of −∞ ("no event yet").
pub const MINUS_INFINITY: Timestamp = -1_000_000.0;

/// Anything at or below this value is treated as [`MINUS_INFINITY`].
///
/// Adding realistic arc or actor delays to the sentinel keeps it below this
/// bound.
pub const NO_EVENT_THRESHOLD: Timestamp = MINUS_INFINITY / 2.0;

/// Character marking a busy time unit in [`trace`] output.
pub const TRACE_BUSY: char = '*';

/// Character marking an idle time unit in [`trace`] output.
pub const TRACE_IDLE: char = '-';

/// Returns `true` when `t` denotes "no event" (possibly shifted by delays).
#[inline]
pub fn is_minus_infinity(t: Timestamp) -> bool {
    t <= NO_EVENT_THRESHOLD
}

/// Returns a sequence of `number_of_tokens` copies of `initial_time`.
pub fn initial_tokens(number_of_tokens: usize, initial_time: Timestamp) -> Sequence {
    vec![initial_time; number_of_tokens]
}

/// Token-shifts `events` by `number_of_tokens`.
///
/// A non-negative count prepends that many `initial_time` events (initial
/// tokens on a channel). A negative count drops that many leading events;
/// dropping more than there are yields the empty sequence.
pub fn delay(events: &[Timestamp], number_of_tokens: i64, initial_time: Timestamp) -> Sequence {
    match usize::try_from(number_of_tokens) {
        Ok(prepend) => {
            let mut out = initial_tokens(prepend, initial_time);
            out.extend_from_slice(events);
            out
        }
        Err(_) => {
            let skip = usize::try_from(number_of_tokens.unsigned_abs()).unwrap_or(usize::MAX);
            events.get(skip..).map_or_else(Vec::new, <[Timestamp]>::to_vec)
        }
    }
}

/// Adds the scalar `time_delay` to every event.
pub fn plus(events: &[Timestamp], time_delay: Timestamp) -> Sequence {
    events.iter().map(|t| t + time_delay).collect()
}

/// Elementwise max of two sequences.
///
/// The result is as long as the shorter input: event `k` can only happen once
/// both constraints provide a `k`-th event.
pub fn max2(a: &[Timestamp], b: &[Timestamp]) -> Sequence {
    a.iter().zip(b).map(|(x, y)| x.max(*y)).collect()
}

/// Left fold of [`max2`] over any number of sequences.
///
/// Returns `None` for an empty input, which stands for the neutral element
/// (an unbounded all-[`MINUS_INFINITY`] sequence). Callers decide whether an
/// empty input set is legal.
pub fn max_n<'a, I>(sequences: I) -> Option<Sequence>
where
    I: IntoIterator<Item = &'a [Timestamp]>,
{
    let mut iter = sequences.into_iter();
    let first = iter.next()?.to_vec();
    Some(iter.fold(first, |acc, seq| max2(&acc, seq)))
}

/// The sequence a consumer sees on a channel: `initial_tokens` token shift
/// followed by an `arc_delay` time shift.
pub fn output_sequence(
    input: &[Timestamp],
    initial_tokens: i64,
    arc_delay: Timestamp,
    initial_time: Timestamp,
) -> Sequence {
    plus(&delay(input, initial_tokens, initial_time), arc_delay)
}

/// Renders an occupancy string of exactly `length` characters.
///
/// Position `k` is [`TRACE_BUSY`] when some event `e` satisfies
/// `e <= k < e + duration`, [`TRACE_IDLE`] otherwise. Events may come in any
/// order; sentinel and non-finite events never mark a cell.
pub fn trace(events: &[Timestamp], duration: Timestamp, length: usize) -> String {
    let mut busy = vec![false; length];
    #[allow(clippy::cast_precision_loss)]
    let horizon = length as Timestamp;
    for &event in events.iter().filter(|e| e.is_finite()) {
        let start = event.ceil().max(0.0);
        let end = (event + duration).ceil().min(horizon);
        if start < end {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (start, end) = (start as usize, end as usize);
            busy[start..end].fill(true);
        }
    }
    busy.into_iter().map(|b| if b { TRACE_BUSY } else { TRACE_IDLE }).collect()
}
