//! Interfaces hacia el estado persistido del host.
//!
//! El motor no lee ni escribe este estado directamente: el contador se
//! incrementa desde el pegamento del host con el total que reporta cada
//! lote, y el flag por sitio se consulta antes de invocar al motor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Almacén clave-valor del host para el contador de archivos saneados.
pub trait CounterStore {
    /// Suma `by` al contador persistido. Se invoca exactamente una vez por
    /// lote completado; los incrementos de cero se omiten antes de llegar.
    fn increment_sanitized(&self, by: u64);

    /// Valor acumulado actual.
    fn sanitized_total(&self) -> u64;
}

/// Implementación en memoria, útil para pruebas y hosts sin persistencia.
#[derive(Debug, Default)]
pub struct MemoryCounter {
    total: AtomicU64,
}

impl CounterStore for MemoryCounter {
    fn increment_sanitized(&self, by: u64) {
        self.total.fetch_add(by, Ordering::Relaxed);
    }

    fn sanitized_total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

/// Reporta el resultado de un lote al almacén del host.
///
/// Omite los lotes sin archivos saneados, igual que el host original.
pub fn report_batch(store: &dyn CounterStore, sanitized_count: u64) {
    if sanitized_count == 0 {
        return;
    }
    store.increment_sanitized(sanitized_count);
}

/// Mapa persistido de hosts con el saneamiento desactivado.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SiteToggles {
    disabled_hosts: HashMap<String, bool>,
}

impl SiteToggles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indica si el saneamiento aplica para `host`.
    pub fn is_enabled(&self, host: &str) -> bool {
        !self.disabled_hosts.get(host).copied().unwrap_or(false)
    }

    pub fn set_disabled(&mut self, host: impl Into<String>, disabled: bool) {
        let host = host.into();
        if disabled {
            self.disabled_hosts.insert(host, true);
        } else {
            self.disabled_hosts.remove(&host);
        }
    }
}
