// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Keyboard input and the countdown timer.
//!
//! The boot manager has exactly one suspension point: waiting until either a key is available or the periodic
//! countdown timer fires. [`InputSource`] expresses that wait. [`UefiInput`] implements it with the
//! [`Input`] protocol's key event and a timer event, using [`boot::wait_for_event`].

use thiserror::Error;
use uefi::{
    Event,
    boot::{self, ScopedProtocol, TimerTrigger},
    proto::console::text::{Input, Key, ScanCode},
};

use crate::{BootResult, system::helper::{create_timer, locate_protocol}};

/// An `Error` that may result from waiting for input.
#[derive(Error, Debug)]
pub enum InputError {
    /// The [`Input`] protocol was closed for any reason.
    #[error("Keyboard Input protocol was closed")]
    InputClosed,
}

/// The event that ended a wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// The countdown timer fired.
    Tick,

    /// A key was pressed.
    Key(Key),
}

/// A source of key presses and timer ticks.
pub trait InputSource {
    /// Arms a periodic timer, firing every `interval` units of 100 nanoseconds.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the timer could not be created.
    fn arm_timer(&mut self, interval: u64) -> BootResult<()>;

    /// Disarms the timer, if it was armed. Waits after this only end on a key press.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the timer could not be cancelled.
    fn disarm_timer(&mut self) -> BootResult<()>;

    /// Blocks until the timer fires or a key is pressed, and returns which happened.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the input device was closed or the wait failed.
    fn wait(&mut self) -> BootResult<InputEvent>;
}

/// Blocks until a key is pressed, ignoring timer ticks.
///
/// # Errors
///
/// May return an `Error` if the input device was closed or the wait failed.
pub fn wait_for_key(input: &mut impl InputSource) -> BootResult<Key> {
    loop {
        if let InputEvent::Key(key) = input.wait()? {
            return Ok(key);
        }
    }
}

/// Checks if a key is the given printable character, ignoring case.
#[must_use = "Has no effect if the result is unused"]
pub fn is_char(key: &Key, c: char) -> bool {
    matches!(key, Key::Printable(k) if char::from(*k).eq_ignore_ascii_case(&c))
}

/// Checks if a key is the return key.
#[must_use = "Has no effect if the result is unused"]
pub fn is_enter(key: &Key) -> bool {
    is_char(key, '\r')
}

/// Checks if a key is the given special key.
#[must_use = "Has no effect if the result is unused"]
pub fn is_special(key: &Key, code: ScanCode) -> bool {
    matches!(key, Key::Special(k) if *k == code)
}

/// Keyboard input through the [`Input`] protocol, with an optional periodic timer.
pub struct UefiInput {
    /// The [`Input`] of the console.
    input: ScopedProtocol<Input>,

    /// The timer event, while it is armed.
    timer: Option<Event>,
}

impl UefiInput {
    /// Opens the console [`Input`].
    ///
    /// # Errors
    ///
    /// May return an `Error` if there is no handle supporting [`Input`].
    pub fn new() -> BootResult<Self> {
        Ok(Self {
            input: locate_protocol::<Input>()?,
            timer: None,
        })
    }
}

impl InputSource for UefiInput {
    fn arm_timer(&mut self, interval: u64) -> BootResult<()> {
        self.disarm_timer()?;
        self.timer = Some(create_timer(TimerTrigger::Periodic(interval))?);
        Ok(())
    }

    fn disarm_timer(&mut self) -> BootResult<()> {
        if let Some(timer) = self.timer.take() {
            boot::set_timer(&timer, TimerTrigger::Cancel)?;
            boot::close_event(timer)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> BootResult<InputEvent> {
        loop {
            let key_event = self
                .input
                .wait_for_key_event()
                .ok_or(InputError::InputClosed)?;

            let fired = if let Some(timer) = &self.timer {
                // SAFETY: the copy only lives for this wait, and is never closed
                let mut events = [key_event, unsafe { timer.unsafe_clone() }];
                boot::wait_for_event(&mut events).map_err(|e| e.to_err_without_payload())?
            } else {
                let mut events = [key_event];
                boot::wait_for_event(&mut events).map_err(|e| e.to_err_without_payload())?
            };

            if fired == 1 {
                return Ok(InputEvent::Tick);
            }

            // the key event may be signaled without a key actually being available
            if let Some(key) = self.input.read_key()? {
                return Ok(InputEvent::Key(key));
            }
        }
    }
}

impl Drop for UefiInput {
    fn drop(&mut self) {
        let _ = self.disarm_timer();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloc::{collections::VecDeque, vec::Vec};

    use uefi::Char16;

    use super::*;

    /// Builds a printable key.
    pub(crate) fn printable(c: char) -> Key {
        Key::Printable(Char16::try_from(c).unwrap())
    }

    /// The return key.
    pub(crate) fn enter() -> Key {
        printable('\r')
    }

    /// Input that replays a fixed script of events.
    ///
    /// Ticks in the script are skipped while the timer is disarmed, the same way a real disarmed timer never
    /// fires. Once the script runs out, waits fail with [`InputError::InputClosed`].
    #[derive(Default)]
    pub(crate) struct ScriptedInput {
        events: VecDeque<InputEvent>,
        pub(crate) armed: Option<u64>,
        pub(crate) disarm_count: usize,
    }

    impl ScriptedInput {
        pub(crate) fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
            Self {
                events: events.into_iter().collect(),
                ..Self::default()
            }
        }

        pub(crate) fn keys(keys: impl IntoIterator<Item = Key>) -> Self {
            Self::new(keys.into_iter().map(InputEvent::Key))
        }

        pub(crate) fn remaining(&self) -> Vec<InputEvent> {
            self.events.iter().copied().collect()
        }
    }

    impl InputSource for ScriptedInput {
        fn arm_timer(&mut self, interval: u64) -> BootResult<()> {
            self.armed = Some(interval);
            Ok(())
        }

        fn disarm_timer(&mut self) -> BootResult<()> {
            if self.armed.take().is_some() {
                self.disarm_count += 1;
            }
            Ok(())
        }

        fn wait(&mut self) -> BootResult<InputEvent> {
            while let Some(event) = self.events.pop_front() {
                if event == InputEvent::Tick && self.armed.is_none() {
                    continue;
                }
                return Ok(event);
            }
            Err(InputError::InputClosed.into())
        }
    }

    #[test]
    fn test_key_predicates() {
        assert!(is_enter(&enter()));
        assert!(is_char(&printable('Q'), 'q'));
        assert!(!is_enter(&printable('q')));
        assert!(is_special(&Key::Special(ScanCode::UP), ScanCode::UP));
        assert!(!is_special(&Key::Special(ScanCode::UP), ScanCode::DOWN));
    }

    #[test]
    fn test_wait_for_key_skips_ticks() {
        let mut input = ScriptedInput::new([
            InputEvent::Tick,
            InputEvent::Tick,
            InputEvent::Key(printable('a')),
        ]);
        input.armed = Some(1);
        assert_eq!(wait_for_key(&mut input).unwrap(), printable('a'));
    }
}
