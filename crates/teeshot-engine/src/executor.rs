use std::collections::VecDeque;

/// Runs a batch of jobs and collects their outputs in submission order.
///
/// The first failing job aborts the batch: queued jobs are dropped and no
/// partial output escapes.
pub trait BatchExecutor {
    /// Upper bound on jobs running at once.
    fn max_in_flight(&self) -> usize;

    fn execute<J, T, E, F>(&self, jobs: Vec<J>, work: F) -> Result<Vec<T>, E>
    where
        F: FnMut(usize, J) -> Result<T, E>;
}

/// FIFO queue with a single in-flight slot; each job finishes before the next starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialExecutor;

impl BatchExecutor for SerialExecutor {
    fn max_in_flight(&self) -> usize {
        1
    }

    fn execute<J, T, E, F>(&self, jobs: Vec<J>, mut work: F) -> Result<Vec<T>, E>
    where
        F: FnMut(usize, J) -> Result<T, E>,
    {
        let mut queue: VecDeque<(usize, J)> = jobs.into_iter().enumerate().collect();
        let mut outputs = Vec::with_capacity(queue.len());
        while let Some((index, job)) = queue.pop_front() {
            outputs.push(work(index, job)?);
        }
        Ok(outputs)
    }
}
