//! The range cursor tracker.
//!
//! One pass over the witnesses locates the optional `OtxStart` marker and
//! the contiguous `Otx` fragments after it, assigning each fragment the
//! half-open index ranges it claims out of the input/output/dep arrays.
//! Everything not claimed by a fragment is the "outside" scope, which is at
//! most two disjoint ranges per axis.

#[cfg(feature = "logging")]
use ckb_cobuild_logger::debug;
use ckb_cobuild_traits::{AccessError, Source, TransactionProvider};
use ckb_cobuild_types::cobuild::{
    try_parse_witness_layout, Message, Otx, OtxStart, SealPair, SighashAll, WitnessLayout,
};

use crate::error::ScriptError;

/// A half-open `[start, end)` index range into one transaction array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorRange {
    pub start: u32,
    pub end: u32,
}

impl CursorRange {
    pub fn new(start: u32, end: u32) -> Self {
        CursorRange { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, index: u32) -> bool {
        self.start <= index && index < self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.start..self.end
    }
}

/// The four running cursors, threaded by value through the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeCursor {
    pub input: u32,
    pub output: u32,
    pub cell_dep: u32,
    pub header_dep: u32,
}

impl From<OtxStart> for RangeCursor {
    fn from(start: OtxStart) -> Self {
        RangeCursor {
            input: start.start_input_cell,
            output: start.start_output_cell,
            cell_dep: start.start_cell_deps,
            header_dep: start.start_header_deps,
        }
    }
}

impl RangeCursor {
    fn advance(&self, otx: &Otx) -> Result<RangeCursor, ScriptError> {
        let add = |cursor: u32, count: u32| {
            cursor.checked_add(count).ok_or(AccessError::OutOfBound)
        };
        Ok(RangeCursor {
            input: add(self.input, otx.input_cells)?,
            output: add(self.output, otx.output_cells)?,
            cell_dep: add(self.cell_dep, otx.cell_deps)?,
            header_dep: add(self.header_dep, otx.header_deps)?,
        })
    }

    fn within(&self, totals: &RangeCursor) -> bool {
        self.input <= totals.input
            && self.output <= totals.output
            && self.cell_dep <= totals.cell_dep
            && self.header_dep <= totals.header_dep
    }
}

/// The ranges one fragment owns, one per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentRanges {
    pub inputs: CursorRange,
    pub outputs: CursorRange,
    pub cell_deps: CursorRange,
    pub header_deps: CursorRange,
}

impl FragmentRanges {
    fn between(from: RangeCursor, to: RangeCursor) -> Self {
        FragmentRanges {
            inputs: CursorRange::new(from.input, to.input),
            outputs: CursorRange::new(from.output, to.output),
            cell_deps: CursorRange::new(from.cell_dep, to.cell_dep),
            header_deps: CursorRange::new(from.header_dep, to.header_dep),
        }
    }
}

/// One tracked open-transaction fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtxFragment {
    /// Index of the fragment's `Otx` witness.
    pub witness_index: usize,
    pub ranges: FragmentRanges,
    pub seals: Vec<SealPair>,
    pub message: Message,
}

/// Up to two disjoint ranges into one transaction array.
///
/// The engine never produces more: a scope is either one whole-transaction
/// range, one fragment range, or the pair of ranges around the fragment
/// block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisRanges {
    ranges: [CursorRange; 2],
}

impl AxisRanges {
    fn single(range: CursorRange) -> Self {
        AxisRanges {
            ranges: [range, CursorRange::default()],
        }
    }

    fn pair(before: CursorRange, after: CursorRange) -> Self {
        AxisRanges {
            ranges: [before, after],
        }
    }

    pub fn contains(&self, index: u32) -> bool {
        self.ranges.iter().any(|range| range.contains(index))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.iter().all(CursorRange::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> {
        let [before, after] = self.ranges;
        before.iter().chain(after.iter())
    }
}

/// One validation scope: up to two ranges per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeRanges {
    pub inputs: AxisRanges,
    pub outputs: AxisRanges,
    pub cell_deps: AxisRanges,
    pub header_deps: AxisRanges,
}

impl OtxFragment {
    /// The fragment's own scope, one range per axis.
    pub fn scopes(&self) -> ScopeRanges {
        ScopeRanges {
            inputs: AxisRanges::single(self.ranges.inputs),
            outputs: AxisRanges::single(self.ranges.outputs),
            cell_deps: AxisRanges::single(self.ranges.cell_deps),
            header_deps: AxisRanges::single(self.ranges.header_deps),
        }
    }
}

/// The result of the single witness scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtxScan {
    /// The tracked fragments, in witness order.
    pub fragments: Vec<OtxFragment>,
    /// The single whole-transaction message witness, if present.
    pub sighash_all: Option<(usize, SighashAll)>,
    start: Option<(usize, RangeCursor)>,
    end_cursor: RangeCursor,
    totals: RangeCursor,
}

fn probe_count<T>(
    mut load: impl FnMut(usize) -> Result<T, AccessError>,
) -> Result<u32, ScriptError> {
    let mut count = 0usize;
    loop {
        match load(count) {
            Ok(_) => count += 1,
            Err(AccessError::OutOfBound) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(count as u32)
}

impl OtxScan {
    /// Scans the witnesses once, classifying each and tracking the cursors
    /// through the contiguous fragment block.
    pub fn scan<P: TransactionProvider>(provider: &P) -> Result<Self, ScriptError> {
        let witness_count = provider.witness_count();
        let mut layouts: Vec<Option<WitnessLayout>> = Vec::with_capacity(witness_count);
        for index in 0..witness_count {
            let witness = provider.witness(index)?;
            layouts.push(try_parse_witness_layout(&witness)?);
        }

        let mut start: Option<(usize, OtxStart)> = None;
        let mut sighash_all: Option<(usize, SighashAll)> = None;
        for (index, layout) in layouts.iter().enumerate() {
            match layout {
                Some(WitnessLayout::OtxStart(marker)) => {
                    if let Some((first, _)) = start {
                        return Err(ScriptError::MultipleOtxStart(first, index));
                    }
                    start = Some((index, *marker));
                }
                Some(WitnessLayout::SighashAll(witness)) => {
                    if sighash_all.is_some() {
                        return Err(ScriptError::UnexpectedWitness(index));
                    }
                    sighash_all = Some((index, witness.clone()));
                }
                _ => {}
            }
        }

        let totals = RangeCursor {
            input: probe_count(|i| provider.input(i))?,
            output: probe_count(|i| provider.cell(i, Source::Output))?,
            cell_dep: probe_count(|i| provider.cell_dep(i))?,
            header_dep: probe_count(|i| provider.header_dep(i))?,
        };

        let mut fragments = Vec::new();
        let (start, end_cursor) = if let Some((start_index, marker)) = start {
            let start_cursor = RangeCursor::from(marker);
            let mut cursor = start_cursor;
            let mut next = start_index + 1;
            while next < witness_count {
                let otx = match &layouts[next] {
                    Some(WitnessLayout::Otx(otx)) => otx,
                    _ => break,
                };
                if otx.input_cells == 0
                    && otx.output_cells == 0
                    && otx.cell_deps == 0
                    && otx.header_deps == 0
                {
                    return Err(ScriptError::EmptyOtxFragment(next));
                }
                let advanced = cursor.advance(otx)?;
                fragments.push(OtxFragment {
                    witness_index: next,
                    ranges: FragmentRanges::between(cursor, advanced),
                    seals: otx.seals.clone(),
                    message: otx.message.clone(),
                });
                cursor = advanced;
                next += 1;
            }
            for (index, layout) in layouts.iter().enumerate() {
                if matches!(layout, Some(WitnessLayout::Otx(_)))
                    && (index < start_index || index >= next)
                {
                    return Err(ScriptError::StrayOtxWitness(index));
                }
            }
            if !cursor.within(&totals) {
                return Err(AccessError::OutOfBound.into());
            }
            (Some((start_index, start_cursor)), cursor)
        } else {
            if let Some(index) = layouts
                .iter()
                .position(|layout| matches!(layout, Some(WitnessLayout::Otx(_))))
            {
                return Err(ScriptError::StrayOtxWitness(index));
            }
            (None, RangeCursor::default())
        };

        #[cfg(feature = "logging")]
        debug!(
            "otx scan: {} fragments, otx start witness {:?}",
            fragments.len(),
            start.map(|(index, _)| index)
        );

        Ok(OtxScan {
            fragments,
            sighash_all,
            start,
            end_cursor,
            totals,
        })
    }

    /// Whether the transaction carries an `OtxStart` marker.
    pub fn has_otx_start(&self) -> bool {
        self.start.is_some()
    }

    /// The scope not claimed by any fragment.
    ///
    /// Without `OtxStart` this is the whole transaction; with it, the pair
    /// of ranges before the starting cursors and after the last fragment.
    pub fn outside_scopes(&self) -> ScopeRanges {
        match self.start {
            None => ScopeRanges {
                inputs: AxisRanges::single(CursorRange::new(0, self.totals.input)),
                outputs: AxisRanges::single(CursorRange::new(0, self.totals.output)),
                cell_deps: AxisRanges::single(CursorRange::new(0, self.totals.cell_dep)),
                header_deps: AxisRanges::single(CursorRange::new(0, self.totals.header_dep)),
            },
            Some((_, start_cursor)) => ScopeRanges {
                inputs: AxisRanges::pair(
                    CursorRange::new(0, start_cursor.input),
                    CursorRange::new(self.end_cursor.input, self.totals.input),
                ),
                outputs: AxisRanges::pair(
                    CursorRange::new(0, start_cursor.output),
                    CursorRange::new(self.end_cursor.output, self.totals.output),
                ),
                cell_deps: AxisRanges::pair(
                    CursorRange::new(0, start_cursor.cell_dep),
                    CursorRange::new(self.end_cursor.cell_dep, self.totals.cell_dep),
                ),
                header_deps: AxisRanges::pair(
                    CursorRange::new(0, start_cursor.header_dep),
                    CursorRange::new(self.end_cursor.header_dep, self.totals.header_dep),
                ),
            },
        }
    }
}
