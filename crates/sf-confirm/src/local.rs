use uuid::Uuid;

use crate::{ConfirmError, PurchaseConfirmer, PurchaseOutcome, PurchaseRequest};

/// In-process confirmer used when no remote collaborator is configured.
/// Every purchase is confirmed with a fresh id.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalConfirmer;

#[async_trait::async_trait]
impl PurchaseConfirmer for LocalConfirmer {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn confirm(&self, _request: &PurchaseRequest) -> Result<PurchaseOutcome, ConfirmError> {
        Ok(PurchaseOutcome::Confirmed {
            confirmation_id: Uuid::new_v4().to_string(),
        })
    }
}
