use crate::error::{Result, TocError};
use crate::toc::entry::TocEntry;
use crate::toc::source::TocLine;
use log::{debug, info};

/// The document side of outline construction.
///
/// Nodes are created once, in document order, under an explicit parent handle
/// and are never touched again by the builder.
pub trait OutlineSink {
    type Handle: Copy;

    fn root_outline(&self) -> Self::Handle;

    /// Create a node under `parent`. Implementations reject pages outside
    /// `1..=page_count()` with [`TocError::InvalidTargetPage`].
    fn create_child(
        &mut self,
        parent: Self::Handle,
        title: &str,
        target_page: i64,
    ) -> Result<Self::Handle>;

    fn page_count(&self) -> u32;
}

/// Rebuilds parent/child edges from entry depths in a single pass.
///
/// The stack holds the handles of open entries with the sink root at the
/// bottom. A new entry at depth `d` after one at depth `last` closes
/// `last - d + 1` entries when `last >= d`, otherwise it nests under the
/// previous entry.
pub struct OutlineBuilder<H> {
    stack: Vec<H>,
    last_depth: Option<usize>,
    page_shift: i64,
}

impl<H: Copy> OutlineBuilder<H> {
    pub fn new(page_shift: i64) -> Self {
        OutlineBuilder {
            stack: Vec::new(),
            last_depth: None,
            page_shift,
        }
    }

    /// Number of open entries, not counting the root.
    pub fn open_depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Add one entry and return the handle of the node created for it.
    pub fn add<S>(&mut self, entry: &TocEntry, sink: &mut S) -> Result<H>
    where
        S: OutlineSink<Handle = H>,
    {
        let target_page = i64::from(entry.page_number)
            .checked_add(self.page_shift)
            .ok_or(TocError::PageShiftOverflow {
                page_number: entry.page_number,
                page_shift: self.page_shift,
            })?;

        match self.last_depth {
            None => self.stack.push(sink.root_outline()),
            Some(last_depth) if last_depth >= entry.depth => {
                let pops = last_depth - entry.depth + 1;
                // The root must survive every pop.
                if pops >= self.stack.len() {
                    return Err(TocError::StackUnderflow {
                        line_number: 0,
                        last_depth,
                        depth: entry.depth,
                    });
                }
                self.stack.truncate(self.stack.len() - pops);
            }
            Some(_) => {}
        }

        let parent = *self.stack.last().ok_or(TocError::StackUnderflow {
            line_number: 0,
            last_depth: self.last_depth.unwrap_or(0),
            depth: entry.depth,
        })?;
        let title = entry.outline_title();
        let handle = sink.create_child(parent, &title, target_page)?;
        debug!(
            "Outline node {:?} -> page {} at depth {}",
            title, target_page, entry.depth
        );

        self.stack.push(handle);
        self.last_depth = Some(entry.depth);

        Ok(handle)
    }
}

/// Feed every entry to `sink` in order. Returns the number of nodes created.
pub fn build<S, I>(entries: I, page_shift: i64, sink: &mut S) -> Result<usize>
where
    S: OutlineSink,
    I: IntoIterator<Item = TocLine>,
{
    let mut builder = OutlineBuilder::new(page_shift);
    let mut created = 0;
    info!(
        "Building outline for a {}-page document, page shift {}",
        sink.page_count(),
        page_shift
    );

    for line in entries {
        builder
            .add(&line.entry, sink)
            .map_err(|e| e.at_line(line.line_number))?;
        created += 1;
    }
    debug!(
        "Created {} outline nodes, {} left open at the end",
        created,
        builder.open_depth()
    );

    Ok(created)
}
