//! Status text for non-operational states

use printerscreen_core::PrinterState;

/// Text shown on the splash screen for `state`
///
/// `state_message` is the host's `webhooks.state_message`, used to pick
/// the error variant. Operational states have no splash text.
pub fn splash_message(state: PrinterState, state_message: Option<&str>) -> Option<&'static str> {
    match state {
        PrinterState::Disconnected => Some("Klipper has disconnected"),
        PrinterState::Startup => Some("Klipper is attempting to start"),
        PrinterState::Shutdown => Some("Klipper has shutdown"),
        PrinterState::Error => {
            let message = state_message.unwrap_or_default();
            if message.contains("FIRMWARE_RESTART") {
                Some("Klipper has encountered an error.\nIssue a FIRMWARE_RESTART to attempt fixing the issue.")
            } else if message.contains("micro-controller") {
                Some("Klipper has encountered an error with the micro-controller.\nPlease recompile and flash.")
            } else {
                Some("Klipper has encountered an error.")
            }
        }
        PrinterState::Ready | PrinterState::Printing | PrinterState::Paused => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_variants() {
        assert_eq!(
            splash_message(
                PrinterState::Error,
                Some("Lost communication with MCU 'mcu'\nOnce the underlying issue is corrected, use the \"FIRMWARE_RESTART\" command")
            ),
            Some("Klipper has encountered an error.\nIssue a FIRMWARE_RESTART to attempt fixing the issue.")
        );
        assert_eq!(
            splash_message(PrinterState::Error, Some("micro-controller protocol mismatch")),
            Some("Klipper has encountered an error with the micro-controller.\nPlease recompile and flash.")
        );
        assert_eq!(
            splash_message(PrinterState::Error, None),
            Some("Klipper has encountered an error.")
        );
    }

    #[test]
    fn test_operational_states_have_no_splash() {
        for state in PrinterState::ALL {
            assert_eq!(splash_message(state, None).is_none(), state.is_operational());
        }
    }
}
