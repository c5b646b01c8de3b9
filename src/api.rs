//! Contract for the remote invoicing collaborator, plus a preview
//! implementation that stands in for the out-of-scope HTTP client.

use serde_json::json;
use tracing::info;

use crate::error::Result;
use crate::model::{CreateResponse, Expense, MappedPayload};

/// Remote invoicing service. Both calls are synchronous and blocking from
/// the orchestrator's point of view; retries and timeouts are the
/// implementor's responsibility.
pub trait InvoicingApi {
    /// Creates the expense remotely. The response is opaque to the
    /// orchestrator and only fed back into [`InvoicingApi::record_payment`].
    fn create_expense(&mut self, payload: &MappedPayload) -> Result<CreateResponse>;

    /// Records a payment for a previously created expense.
    fn record_payment(
        &mut self,
        expense: &Expense,
        payload: &MappedPayload,
        created: &CreateResponse,
    ) -> Result<()>;
}

/// Client that logs the serialised payloads instead of transmitting them.
/// Used by the bundled runner; real deployments substitute an HTTP-backed
/// implementation of [`InvoicingApi`].
#[derive(Debug, Default)]
pub struct PreviewApi {
    created: u64,
}

impl InvoicingApi for PreviewApi {
    fn create_expense(&mut self, payload: &MappedPayload) -> Result<CreateResponse> {
        self.created += 1;
        let body = serde_json::to_value(payload)?;
        info!(name = %payload.invoice.name, payload = %body, "previewing expense create");
        Ok(CreateResponse(json!({
            "preview": true,
            "sequence": self.created,
        })))
    }

    fn record_payment(
        &mut self,
        expense: &Expense,
        payload: &MappedPayload,
        created: &CreateResponse,
    ) -> Result<()> {
        info!(
            expense = %expense.id,
            total = payload.invoice.total.as_deref().unwrap_or("0"),
            response = %created.0,
            "previewing payment record"
        );
        Ok(())
    }
}
