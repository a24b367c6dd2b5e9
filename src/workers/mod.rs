//! # Workers
//!
//! Pool genérico de threads: no sabe nada de HTTP, solo ejecuta tareas.
//! El servidor encola una tarea por conexión aceptada.

pub mod pool;

pub use pool::{Task, WorkerPool};
