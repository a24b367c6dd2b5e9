//! # Pool de Workers
//! src/workers/pool.rs
//!
//! Número fijo de threads que vacían una cola FIFO compartida.
//!
//! ## Arquitectura
//!
//! ```text
//! submit(task) ──► Mutex<{ cola, accepting }> ──► Condvar ──► worker-N
//!                                                              │
//!                                                         task() ◄┘
//! ```
//!
//! Cada worker espera hasta que la cola tenga tareas o el pool se apague.
//! Si se apagó y la cola está vacía, termina; si no, toma una tarea y la
//! ejecuta fuera del lock. Un panic dentro de una tarea se captura y solo
//! afecta a esa tarea.
//!
//! `shutdown` deja de aceptar trabajo, despierta a todos y espera a que se
//! vacíe la cola.

use crate::error::PoolError;
use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use tracing::{debug, error};

/// Unidad de trabajo: se ejecuta una sola vez, en un solo worker
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Estado protegido por el lock
struct QueueState {
    tasks: VecDeque<Task>,
    accepting: bool,
}

/// Cola compartida entre el pool y sus workers
struct Shared {
    state: Mutex<QueueState>,
    condvar: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Las tareas corren fuera del lock: un lock envenenado sigue siendo consistente
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Worker {
    id: usize,
    thread: thread::JoinHandle<()>,
}

/// Pool de threads con cola FIFO sin límite de capacidad
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Crea un pool con `size` workers
    ///
    /// Un `size` de 0 se trata como 1.
    pub fn new(size: usize) -> io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                accepting: true,
            }),
            condvar: Condvar::new(),
        });

        let size = size.max(1);
        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(size),
        };

        for id in 0..size {
            let shared = Arc::clone(&pool.shared);
            // Si falla un spawn, Drop apaga los workers ya creados
            let thread = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker_loop(id, &shared))?;
            pool.workers.push(Worker { id, thread });
        }

        Ok(pool)
    }

    /// Pool con un worker por thread de hardware disponible
    pub fn with_available_parallelism() -> io::Result<Self> {
        Self::new(default_size())
    }

    /// Encola una tarea y retorna de inmediato
    ///
    /// Falla si el pool ya fue apagado.
    pub fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.shared.lock();
            if !state.accepting {
                return Err(PoolError::ShuttingDown);
            }
            state.tasks.push_back(Box::new(task));
        }

        self.shared.condvar.notify_one();
        Ok(())
    }

    /// Número de workers
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Tareas esperando en la cola
    pub fn queued(&self) -> usize {
        self.shared.lock().tasks.len()
    }

    /// Deja de aceptar trabajo, drena la cola y espera a todos los workers
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.lock();
            state.accepting = false;
            // notify_all bajo el mismo lock que submit: ningún worker pierde el aviso
            self.shared.condvar.notify_all();
        }

        for worker in self.workers.drain(..) {
            debug!(worker = worker.id, "waiting for worker to finish");
            if worker.thread.join().is_err() {
                error!(worker = worker.id, "worker thread panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Tamaño por defecto: threads de hardware disponibles (1 si no se sabe)
pub fn default_size() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn worker_loop(id: usize, shared: &Shared) {
    debug!(worker = id, "worker started");

    loop {
        let task = {
            let mut state = shared
                .condvar
                .wait_while(shared.lock(), |state| state.accepting && state.tasks.is_empty())
                .unwrap_or_else(PoisonError::into_inner);

            match state.tasks.pop_front() {
                Some(task) => task,
                // Apagado y con la cola vacía
                None => break,
            }
        };

        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!(worker = id, "task panicked; worker keeps running");
        }
    }

    debug!(worker = id, "worker stopped");
}
