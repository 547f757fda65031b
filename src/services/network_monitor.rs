// ============================================================================
// MONITOR DE ESTADO DE RED
// ============================================================================
// Señal booleana de conectividad, process-wide, con un solo escritor (el
// wiring de plataforma o los tests). Las transiciones notifican a los
// listeners; la transición offline→online es el disparador del drenado.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Offline,
    Unknown,
}

impl NetworkStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, NetworkStatus::Online)
    }
}

type StatusCallback = Box<dyn Fn(NetworkStatus)>;

/// Monitor de conectividad. Sin lógica de negocio: pasa la señal de
/// alcanzabilidad de la plataforma a quien se suscriba.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    status: Rc<RefCell<NetworkStatus>>,
    listeners: Rc<RefCell<Vec<StatusCallback>>>,
    // Flag para prevenir múltiples registros de listeners del navegador
    attached: Rc<RefCell<bool>>,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        Self {
            status: Rc::new(RefCell::new(NetworkStatus::Unknown)),
            listeners: Rc::new(RefCell::new(Vec::new())),
            attached: Rc::new(RefCell::new(false)),
        }
    }

    pub fn current_status(&self) -> NetworkStatus {
        *self.status.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.current_status().is_online()
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.current_status(), NetworkStatus::Offline)
    }

    /// Suscribirse a transiciones de estado. No registrar listeners desde
    /// dentro de un callback.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(NetworkStatus) + 'static,
    {
        self.listeners.borrow_mut().push(Box::new(callback));
    }

    /// Único punto de escritura de la señal. Notifica sólo en transiciones
    /// reales: repetir el mismo estado no dispara nada.
    pub fn set_status(&self, new_status: NetworkStatus) {
        let changed = {
            let mut status = self.status.borrow_mut();
            if *status == new_status {
                false
            } else {
                *status = new_status;
                true
            }
        };
        if !changed {
            return;
        }
        match new_status {
            NetworkStatus::Online => log::info!("🌐 Network: ONLINE"),
            NetworkStatus::Offline => log::warn!("📴 Network: OFFLINE"),
            NetworkStatus::Unknown => {}
        }
        for callback in self.listeners.borrow().iter() {
            callback(new_status);
        }
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl ConnectivityMonitor {
    /// Lee navigator.onLine y registra los listeners online/offline del
    /// navegador, con debounce para no agitar la cola con señales
    /// inestables. Sólo se registra una vez.
    pub fn attach_to_window(&self) {
        use gloo_timers::callback::Timeout;
        use wasm_bindgen::prelude::*;
        use wasm_bindgen::JsCast;

        {
            let mut attached = self.attached.borrow_mut();
            if *attached {
                log::warn!("⚠️ ConnectivityMonitor: attach_to_window ya fue llamado, ignorando");
                return;
            }
            *attached = true;
        }

        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };

        // Estado inicial sin debounce
        let initial = if window.navigator().on_line() {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        };
        self.set_status(initial);

        let pending: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));

        let schedule = {
            let monitor = self.clone();
            let pending = pending.clone();
            move |status: NetworkStatus| {
                let monitor = monitor.clone();
                let timeout = Timeout::new(crate::utils::constants::NETWORK_DEBOUNCE_MS, move || {
                    monitor.set_status(status);
                });
                // Reemplazar el timeout anterior lo cancela: sólo cuenta la
                // última señal dentro de la ventana de debounce
                *pending.borrow_mut() = Some(timeout);
            }
        };

        let online_closure = Closure::wrap(Box::new({
            let schedule = schedule.clone();
            move |_event: web_sys::Event| schedule(NetworkStatus::Online)
        }) as Box<dyn FnMut(web_sys::Event)>);

        let offline_closure = Closure::wrap(Box::new({
            let schedule = schedule.clone();
            move |_event: web_sys::Event| schedule(NetworkStatus::Offline)
        }) as Box<dyn FnMut(web_sys::Event)>);

        let _ = window
            .add_event_listener_with_callback("online", online_closure.as_ref().unchecked_ref());
        let _ = window
            .add_event_listener_with_callback("offline", offline_closure.as_ref().unchecked_ref());

        // Los listeners globales viven toda la vida de la app
        online_closure.forget();
        offline_closure.forget();

        log::info!("✅ ConnectivityMonitor: listeners registrados (solo una vez)");
    }
}
