//! Two-phase saga with explicit compensation.
//!
//! Provisioning workflows write to two independently-failing systems
//! without a shared transaction. [`with_compensation`] gives that shape a
//! direct expression: run the primary step, run the secondary step, and on
//! primary-success-but-secondary-failure always run the compensating
//! action exactly once. The outcome distinguishes "primary failed" from
//! "primary ok, secondary failed, compensation ok/failed" so callers never
//! lose the compensation result.

use std::future::Future;

use quill_core::ProvisionError;

/// Failure outcome of a two-phase workflow.
#[derive(Debug)]
pub enum SagaFailure {
    /// The primary step failed; nothing else ran, nothing to undo.
    Primary(ProvisionError),
    /// The secondary step failed and the compensation succeeded; the
    /// primary step's effect has been undone.
    Compensated { original: ProvisionError },
    /// The secondary step failed and so did the compensation; both
    /// systems may now disagree and need manual reconciliation.
    CompensationFailed {
        original: ProvisionError,
        compensation: ProvisionError,
    },
}

impl SagaFailure {
    /// Collapse into the error surfaced to the caller.
    ///
    /// A compensated failure surfaces the original error; a failed
    /// compensation escalates to `PartialProvisioningFailure` carrying
    /// both causes.
    #[must_use]
    pub fn into_provision_error(self) -> ProvisionError {
        match self {
            SagaFailure::Primary(err) => err,
            SagaFailure::Compensated { original } => original,
            SagaFailure::CompensationFailed {
                original,
                compensation,
            } => ProvisionError::partial_provisioning(original, compensation),
        }
    }

    /// Whether the compensating action ran and succeeded.
    #[must_use]
    pub fn was_compensated(&self) -> bool {
        matches!(self, SagaFailure::Compensated { .. })
    }
}

/// Run `primary`, then `secondary`; compensate on secondary failure.
///
/// The compensation runs exactly once, only when the primary step
/// succeeded and the secondary step failed. Nothing is retried. Both
/// closures receive the primary step's output.
///
/// # Errors
///
/// See [`SagaFailure`].
pub async fn with_compensation<T, U, PFut, SF, SFut, CF, CFut>(
    primary: PFut,
    secondary: SF,
    compensation: CF,
) -> Result<(T, U), SagaFailure>
where
    PFut: Future<Output = Result<T, ProvisionError>>,
    SF: FnOnce(&T) -> SFut,
    SFut: Future<Output = Result<U, ProvisionError>>,
    CF: FnOnce(&T) -> CFut,
    CFut: Future<Output = Result<(), ProvisionError>>,
{
    let primary_output = primary.await.map_err(SagaFailure::Primary)?;

    match secondary(&primary_output).await {
        Ok(secondary_output) => Ok((primary_output, secondary_output)),
        Err(original) => match compensation(&primary_output).await {
            Ok(()) => Err(SagaFailure::Compensated { original }),
            Err(compensation) => Err(SagaFailure::CompensationFailed {
                original,
                compensation,
            }),
        },
    }
}
