//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use arm_lib::data_store::{DataStore, SafeModeCause};
use comms_if::tc::Tc;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules. While in safe mode only
/// `MakeUnsafe` is executed, returns `false` if the TC was rejected.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc) -> bool {
    if ds.safe && *tc != Tc::MakeUnsafe {
        warn!("Arm is in safe mode, rejecting {:?}", tc);
        return false;
    }

    match tc {
        Tc::MakeSafe => {
            debug!("Received MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
        }
        Tc::MakeUnsafe => {
            debug!("Received MakeUnsafe command");
            if ds.make_unsafe(SafeModeCause::MakeSafeTc).is_err() {
                warn!(
                    "Safe mode was not entered by a TC (cause: {:?}), staying safe",
                    ds.safe_cause
                );
            }
        }
        Tc::Arm(cmd) => ds.arm_ctrl_input.cmd = Some(*cmd),
    }

    true
}
