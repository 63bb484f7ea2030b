// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Various helper functions for other modules.

use thiserror::Error;
use uefi::{
    CString16, Event,
    boot::{self, EventType, ScopedProtocol, TimerTrigger, Tpl},
    proto::ProtocolPointer,
};

use crate::BootResult;

/// An `Error` that may result from converting a [`str`] to another format.
#[derive(Error, Debug)]
pub enum StrError {
    /// A [`str`] could not be converted into a [`CString16`]
    #[error("Could not convert String to CString16")]
    CstrFromStr(#[from] uefi::data_types::FromStrError),

    /// A slice could not be converted into a [`CString16`], due to an invalid
    /// character or a missing nul character.
    #[error("Could not convert a slice to a CString16")]
    FromSliceWithNul(#[from] uefi::data_types::FromSliceWithNulError),
}

/// Gets a [`CString16`] from an [`&str`].
///
/// # Errors
///
/// May return an `Error` if the string could not be converted into a [`CString16`], either due to unsupported
/// characters or an invalid nul character.
pub fn str_to_cstr(str: &str) -> Result<CString16, StrError> {
    Ok(CString16::try_from(str)?)
}

/// Opens a protocol exclusively from the first handle that supports it.
///
/// # Errors
///
/// May return an `Error` if no handle supports the protocol, or the protocol could not be opened.
pub fn locate_protocol<P: ProtocolPointer + ?Sized>() -> BootResult<ScopedProtocol<P>> {
    let handle = boot::get_handle_for_protocol::<P>()?;
    Ok(boot::open_protocol_exclusive::<P>(handle)?)
}

/// Creates a timer event and arms it with a [`TimerTrigger`].
///
/// The event is closed again if it could not be armed.
///
/// # Errors
///
/// May return an `Error` if the event could not be created or armed.
pub fn create_timer(trigger: TimerTrigger) -> BootResult<Event> {
    // SAFETY: there is no notify function, so nothing will be called back into at a raised TPL
    let event = unsafe { boot::create_event(EventType::TIMER, Tpl::APPLICATION, None, None)? };
    if let Err(e) = boot::set_timer(&event, trigger) {
        let _ = boot::close_event(event);
        return Err(e.into());
    }
    Ok(event)
}
