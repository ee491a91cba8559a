//! Admission trait used by the HTTP gate.

/// Anything that can answer "may this client proceed right now?".
///
/// The gate is generic over this trait so alternative admission policies
/// (or test doubles) can sit behind the same middleware.
pub trait AdmissionControl: Send + Sync {
    /// Decide whether a request from `client_id` is admitted.
    ///
    /// Never fails; the answer is always a definitive allow or deny.
    fn decide(&self, client_id: &str) -> bool;
}
