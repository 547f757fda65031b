use serde::{Deserialize, Serialize};

use crate::services::api_client::ApiError;

/// Estado de sincronización agregado (para el indicador de la UI)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SyncState {
    Synced,
    Pending { count: usize },
    Syncing,
    Offline { pending_count: usize },
    AuthRequired { pending_count: usize },
    Error { message: String },
}

impl Default for SyncState {
    fn default() -> Self {
        SyncState::Synced
    }
}

/// Máquina de estados de una mutación:
/// idle → applying → {dispatching | queued} → {reconciled | rolled_back | failed}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    Applying,
    Dispatching,
    Queued,
    Reconciled,
    RolledBack,
    Failed,
}

/// Resultado de una mutación optimista de cara al llamador
#[derive(Clone, Debug, PartialEq)]
pub enum MutationOutcome {
    /// Camino online: el servidor confirmó y la caché quedó reconciliada
    Confirmed,
    /// Camino offline: encolada; para el usuario es un éxito pendiente
    Queued { action_id: String },
    /// Camino online fallido: la caché volvió al snapshot previo
    RolledBack { error: ApiError },
}

/// Resumen de una pasada de drenado de la cola
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrainSummary {
    pub processed: usize,
    pub failed: usize,
    pub remaining: usize,
}
