use crate::renderer::error::{RenderError, Result};
use crate::renderer::partition::Slice;
use crate::renderer::surface::{CommandRecorder, LiveResources};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed set of recording surfaces, one per worker slot, plus the threads
/// that record into them. Exists only while Parallel mode is active.
pub(crate) struct WorkerPool {
    surfaces: Vec<CommandRecorder>,
    threads: rayon::ThreadPool,
    in_flight: AtomicUsize,
}

impl WorkerPool {
    pub(crate) fn new(
        workers: usize,
        thread_name_prefix: &str,
        live: &LiveResources,
    ) -> Result<Self> {
        let workers = workers.max(1);
        let prefix = thread_name_prefix.to_owned();
        let threads = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |index| format!("{prefix}-{index}"))
            .build()
            .map_err(RenderError::from)?;

        let surfaces = (0..workers)
            .map(|slot| CommandRecorder::new(slot, live))
            .collect();

        log::info!("Created {} recording surfaces", workers);

        Ok(Self {
            surfaces,
            threads,
            in_flight: AtomicUsize::new(0),
        })
    }

    pub(crate) fn worker_count(&self) -> usize {
        self.surfaces.len()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub(crate) fn surfaces_mut(&mut self) -> &mut [CommandRecorder] {
        &mut self.surfaces
    }

    /// Spawns one task per slice, each recording into the surface of the
    /// slice's worker slot, and blocks until every task has finished.
    ///
    /// Results come back indexed by slice. Every task runs to completion even
    /// when another one fails.
    pub(crate) fn fork<F>(&mut self, slices: &[Slice], record: F) -> Vec<Result<usize>>
    where
        F: Fn(&Slice, &mut CommandRecorder) -> Result<usize> + Sync,
    {
        assert!(
            slices.len() <= self.surfaces.len(),
            "{} slices for {} recording surfaces",
            slices.len(),
            self.surfaces.len()
        );

        let mut results: Vec<Result<usize>> = slices.iter().map(|_| Ok(0)).collect();
        if slices.is_empty() {
            return results;
        }

        let Self {
            surfaces,
            threads,
            in_flight,
        } = self;
        let record = &record;
        let in_flight = &*in_flight;

        threads.scope(|scope| {
            for ((slice, surface), result) in slices
                .iter()
                .zip(surfaces.iter_mut())
                .zip(results.iter_mut())
            {
                let task = InFlight::enter(in_flight);
                scope.spawn(move |_| {
                    *result = record(slice, surface);
                    drop(task);
                });
            }
        });

        results
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let outstanding = self.in_flight();
        if !std::thread::panicking() {
            assert_eq!(
                outstanding, 0,
                "recording surfaces torn down with {outstanding} recorder tasks outstanding"
            );
        }
        log::info!("Released {} recording surfaces", self.surfaces.len());
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
