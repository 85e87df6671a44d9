use crate::renderer::error::Result;
use crate::renderer::surface::{CommandRecorder, SubmissionQueue};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Collected {
    pub(crate) command_lists: usize,
    pub(crate) draw_calls: usize,
}

/// Join-side half of a parallel batch.
///
/// `results[i]` belongs to `surfaces[i]`. When every slice succeeded, each
/// surface is finalized and its list submitted in ascending slot order,
/// whatever order the recording threads finished in. When any slice failed,
/// nothing is submitted, every touched surface is reset, and the error of the
/// lowest failing slice is returned.
pub(crate) fn collect<Q>(
    results: Vec<Result<usize>>,
    surfaces: &mut [CommandRecorder],
    queue: &mut Q,
) -> Result<Collected>
where
    Q: SubmissionQueue + ?Sized,
{
    let surfaces = &mut surfaces[..results.len()];

    let mut first_error = None;
    for (slot, result) in results.into_iter().enumerate() {
        if let Err(err) = result {
            log::error!("Recording slice {} failed: {}", slot, err);
            if first_error.is_none() {
                first_error = Some(err);
            }
        }
    }

    if let Some(err) = first_error {
        for surface in surfaces.iter_mut() {
            surface.reset();
        }
        return Err(err);
    }

    let mut collected = Collected::default();
    for surface in surfaces.iter_mut() {
        let list = surface.finish();
        collected.command_lists += 1;
        collected.draw_calls += list.draw_count();
        queue.execute(list);
    }

    Ok(collected)
}
