// ============================================================================
// ACTION QUEUE STORE - Cola durable de mutaciones pendientes
// ============================================================================
// FIFO estricto por orden de creación, con una sola acción in_flight a la
// vez. Sobrevive reinicios: se persiste tras cada mutación y al recargar
// las acciones interrumpidas vuelven a pending. Las acciones que agotan su
// presupuesto de reintentos NUNCA se descartan en silencio: quedan en
// failed, visibles, hasta que el usuario las descarte o las reintente.
// ============================================================================

use std::rc::Rc;

use crate::models::action::{ActionPayload, ActionStatus, QueuedAction};
use crate::utils::constants::QUEUE_STORAGE_KEY;
use crate::utils::storage::{load_json, save_json, StorageBackend};

pub struct ActionQueueStore {
    actions: Vec<QueuedAction>,
    storage: Rc<dyn StorageBackend>,
}

impl ActionQueueStore {
    /// Carga la cola persistida. Las acciones que quedaron in_flight en la
    /// sesión anterior (reinicio a mitad de drenado) vuelven a pending.
    pub fn load(storage: Rc<dyn StorageBackend>) -> Self {
        let mut actions: Vec<QueuedAction> = match load_json(&*storage, QUEUE_STORAGE_KEY) {
            Ok(Some(actions)) => actions,
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("❌ Error cargando la cola persistida: {}", e);
                Vec::new()
            }
        };

        let mut recovered = 0;
        for action in &mut actions {
            if action.status == ActionStatus::InFlight {
                action.status = ActionStatus::Pending;
                recovered += 1;
            }
        }
        if recovered > 0 {
            log::warn!("🔁 {} acciones interrumpidas recuperadas a pending", recovered);
        }
        if !actions.is_empty() {
            log::info!("📋 Cola cargada: {} acciones", actions.len());
        }

        Self { actions, storage }
    }

    fn persist(&self) {
        if let Err(e) = save_json(&*self.storage, QUEUE_STORAGE_KEY, &self.actions) {
            log::error!("❌ Error persistiendo la cola: {}", e);
        }
    }

    /// Encola una mutación y devuelve su id
    pub fn enqueue(&mut self, payload: ActionPayload) -> String {
        let action = QueuedAction::new(payload);
        let id = action.id.clone();
        log::info!("📝 Acción encolada: {} ({})", action.payload.describe(), id);
        self.actions.push(action);
        self.persist();
        id
    }

    /// Devuelve la acción pendiente más antigua marcándola in_flight.
    /// None si no hay pendientes, si otra acción sigue in_flight (el drenado
    /// es serializado) o si a la cabeza no le ha vencido la ventana de
    /// backoff (el FIFO nunca se reordena saltándose la cabeza).
    pub fn dequeue_next(&mut self, now: i64) -> Option<QueuedAction> {
        if self.has_in_flight() {
            return None;
        }
        let idx = self
            .actions
            .iter()
            .position(|a| a.status == ActionStatus::Pending)?;
        if !self.actions[idx].should_retry(now) {
            return None;
        }
        let action = &mut self.actions[idx];
        action.status = ActionStatus::InFlight;
        action.register_attempt(now);
        let snapshot = action.clone();
        self.persist();
        Some(snapshot)
    }

    /// Acción confirmada: se elimina del store
    pub fn mark_done(&mut self, id: &str) -> bool {
        let before = self.actions.len();
        self.actions.retain(|a| a.id != id);
        let removed = self.actions.len() < before;
        if removed {
            log::info!("✅ Acción {} completada y eliminada de la cola", id);
            self.persist();
        } else {
            log::warn!("⚠️ mark_done sobre acción desconocida: {}", id);
        }
        removed
    }

    /// Registra un intento fallido. `terminal` (validación/auth) congela la
    /// acción en failed sin consumir presupuesto; un fallo transitorio
    /// incrementa retry_count y la devuelve a pending mientras quede
    /// presupuesto.
    pub fn mark_failed(&mut self, id: &str, error: &str, terminal: bool) -> Option<ActionStatus> {
        let action = self.actions.iter_mut().find(|a| a.id == id)?;
        action.last_error = Some(error.to_string());

        if terminal {
            action.status = ActionStatus::Failed;
            log::error!(
                "⛔ Fallo terminal en {} ({}): {}",
                action.payload.describe(),
                id,
                error
            );
        } else {
            action.retry_count += 1;
            if action.retry_count >= action.max_retries {
                action.status = ActionStatus::Failed;
                log::error!(
                    "⛔ Reintentos agotados ({}/{}) en {}: {}",
                    action.retry_count,
                    action.max_retries,
                    action.payload.describe(),
                    error
                );
            } else {
                action.status = ActionStatus::Pending;
                log::warn!(
                    "⚠️ Intento {}/{} fallido en {}, se reintentará: {}",
                    action.retry_count,
                    action.max_retries,
                    action.payload.describe(),
                    error
                );
            }
        }

        let status = action.status;
        self.persist();
        Some(status)
    }

    /// Lista completa para inspección de la UI
    pub fn list(&self) -> Vec<QueuedAction> {
        self.actions.clone()
    }

    pub fn list_failed(&self) -> Vec<QueuedAction> {
        self.actions
            .iter()
            .filter(|a| a.status == ActionStatus::Failed)
            .cloned()
            .collect()
    }

    /// Descarte explícito por el usuario; sólo acciones fallidas
    pub fn remove(&mut self, id: &str) -> Result<(), String> {
        match self.actions.iter().position(|a| a.id == id) {
            None => Err(format!("acción desconocida: {}", id)),
            Some(idx) if self.actions[idx].status != ActionStatus::Failed => {
                Err("sólo se pueden descartar acciones fallidas".to_string())
            }
            Some(idx) => {
                let action = self.actions.remove(idx);
                log::info!("🗑️ Acción descartada: {}", action.payload.describe());
                self.persist();
                Ok(())
            }
        }
    }

    /// "Reintentar todo": failed → pending con presupuesto restablecido
    pub fn retry_failed(&mut self) -> usize {
        let mut count = 0;
        for action in &mut self.actions {
            if action.status == ActionStatus::Failed {
                action.status = ActionStatus::Pending;
                action.retry_count = 0;
                action.last_attempt = None;
                count += 1;
            }
        }
        if count > 0 {
            self.persist();
        }
        count
    }

    /// Retrocede los últimos intentos para vencer ventanas de backoff en tests
    #[cfg(test)]
    pub(crate) fn backdate_attempts(&mut self, seconds: i64) {
        for action in &mut self.actions {
            if let Some(ts) = action.last_attempt {
                action.last_attempt = Some(ts - seconds);
            }
        }
        self.persist();
    }

    pub fn has_in_flight(&self) -> bool {
        self.actions
            .iter()
            .any(|a| a.status == ActionStatus::InFlight)
    }

    pub fn pending_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.status == ActionStatus::Pending)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.status == ActionStatus::Failed)
            .count()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::storage::MemoryStorage;

    fn store() -> (ActionQueueStore, Rc<MemoryStorage>) {
        let storage = Rc::new(MemoryStorage::new());
        (ActionQueueStore::load(storage.clone()), storage)
    }

    fn cart_add(product_id: &str, quantity: u32) -> ActionPayload {
        ActionPayload::CartAdd {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn dequeue_is_fifo() {
        let (mut queue, _) = store();
        let a = queue.enqueue(cart_add("P1", 2));
        let b = queue.enqueue(cart_add("P2", 1));

        let first = queue.dequeue_next(0).unwrap();
        assert_eq!(first.id, a);
        queue.mark_done(&a);

        let second = queue.dequeue_next(0).unwrap();
        assert_eq!(second.id, b);
    }

    #[test]
    fn only_one_action_in_flight() {
        let (mut queue, _) = store();
        queue.enqueue(cart_add("P1", 1));
        queue.enqueue(cart_add("P2", 1));

        let first = queue.dequeue_next(0).unwrap();
        assert!(queue.has_in_flight());
        // la segunda no sale mientras la primera siga in_flight
        assert!(queue.dequeue_next(0).is_none());

        queue.mark_done(&first.id);
        assert!(queue.dequeue_next(0).is_some());
    }

    #[test]
    fn transient_failures_consume_budget_then_freeze_as_failed() {
        let (mut queue, _) = store();
        let id = queue.enqueue(cart_add("P1", 1));
        let max_retries = queue.list()[0].max_retries;

        let mut now = 0;
        for attempt in 1..=max_retries {
            let action = queue.dequeue_next(now).unwrap();
            let status = queue.mark_failed(&action.id, "timeout", false).unwrap();
            if attempt < max_retries {
                assert_eq!(status, ActionStatus::Pending);
            } else {
                assert_eq!(status, ActionStatus::Failed);
            }
            // saltar la ventana de backoff para el siguiente intento
            now += 10_000;
        }

        // nunca se pierde en silencio: sigue visible como fallida
        assert_eq!(queue.failed_count(), 1);
        assert_eq!(queue.list_failed()[0].id, id);
        assert!(queue.dequeue_next(now).is_none());
    }

    #[test]
    fn terminal_failure_skips_retry_budget() {
        let (mut queue, _) = store();
        let id = queue.enqueue(cart_add("P1", 1));
        let action = queue.dequeue_next(0).unwrap();

        let status = queue.mark_failed(&action.id, "sin stock", true).unwrap();
        assert_eq!(status, ActionStatus::Failed);
        // el fallo terminal no consumió reintentos
        assert_eq!(queue.list_failed()[0].retry_count, 0);
        assert_eq!(queue.list_failed()[0].id, id);
    }

    #[test]
    fn backoff_gate_blocks_the_head_without_reordering() {
        let (mut queue, _) = store();
        let first = queue.enqueue(cart_add("P1", 1));
        queue.enqueue(cart_add("P2", 1));

        let action = queue.dequeue_next(1_000).unwrap();
        let _ = queue.mark_failed(&action.id, "timeout", false);

        // la cabeza está en ventana de backoff: no sale ella ni la siguiente
        assert!(queue.dequeue_next(1_001).is_none());

        let elapsed = 1_000 + queue.list()[0].backoff_seconds();
        let retried = queue.dequeue_next(elapsed).unwrap();
        assert_eq!(retried.id, first);
    }

    #[test]
    fn remove_only_discards_failed_actions() {
        let (mut queue, _) = store();
        let id = queue.enqueue(cart_add("P1", 1));
        assert!(queue.remove(&id).is_err());

        let action = queue.dequeue_next(0).unwrap();
        let _ = queue.mark_failed(&action.id, "sin stock", true);
        assert!(queue.remove(&id).is_ok());
        assert!(queue.is_empty());
    }

    #[test]
    fn retry_failed_resets_budget() {
        let (mut queue, _) = store();
        let id = queue.enqueue(cart_add("P1", 1));
        let action = queue.dequeue_next(0).unwrap();
        let _ = queue.mark_failed(&action.id, "sin stock", true);
        assert_eq!(queue.failed_count(), 1);

        assert_eq!(queue.retry_failed(), 1);
        assert_eq!(queue.pending_count(), 1);
        let retried = queue.dequeue_next(0).unwrap();
        assert_eq!(retried.id, id);
        assert_eq!(retried.retry_count, 0);
    }

    #[test]
    fn queue_survives_restart_and_recovers_in_flight() {
        let storage = Rc::new(MemoryStorage::new());
        let first_id;
        {
            let mut queue = ActionQueueStore::load(storage.clone());
            first_id = queue.enqueue(cart_add("P1", 2));
            queue.enqueue(cart_add("P2", 5));
            // simular reinicio a mitad de drenado
            queue.dequeue_next(0).unwrap();
        }

        let mut reloaded = ActionQueueStore::load(storage);
        assert_eq!(reloaded.len(), 2);
        assert!(!reloaded.has_in_flight());
        // el orden FIFO se conserva y la interrumpida vuelve a salir primero
        let head = reloaded.dequeue_next(10_000).unwrap();
        assert_eq!(head.id, first_id);
    }
}
