use rayon::prelude::*;

/// Runs independent images on a fixed-size thread pool.
///
/// A failing or panicking image is logged and reported in its slot without
/// affecting the rest of the batch.
pub struct Pool {
    pool: rayon::ThreadPool,
}

impl Pool {
    /// `threads == 0` sizes the pool to the available cores
    pub fn new(threads: usize) -> anyhow::Result<Self> {
        let threads = match threads {
            0 => num_cpus::get(),
            n => n,
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("hseg-worker-{}", i))
            .build()?;
        log::info!("{:<32}{:<32}", "inference threads", threads);
        Ok(Self { pool })
    }
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Apply `task` to every item in parallel, preserving order.
    pub fn map<T, R, G>(&self, items: &[T], task: G) -> Vec<anyhow::Result<R>>
    where
        T: Sync,
        R: Send,
        G: Fn(&T) -> anyhow::Result<R> + Sync,
    {
        self.pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map(|(i, item)| {
                    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| task(item)))
                        .unwrap_or_else(|_| Err(anyhow::anyhow!("image {} panicked", i)));
                    if let Err(ref e) = result {
                        log::warn!("{:<32}{:<32}", format!("image {} skipped", i), format!("{:#}", e));
                    }
                    result
                })
                .collect()
        })
    }
}
