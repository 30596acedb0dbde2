use crate::util::Log;
use crate::{
    Candidate, ConfigError, Coord, Document, EndKind, Feature, NodeHandle, Phrase, PhraseRef,
    Shape, Stream, TokenIdx, TokenizeStream,
};

#[derive(Clone)]
struct Frame {
    node: TokenIdx,
    phrase: PhraseRef,
}

/// Drive `root` over `rows`, returning the committed token arena.
pub(crate) fn run(root: PhraseRef, rows: Vec<String>) -> Result<Document, ConfigError> {
    if root.sub_phrases().is_empty() {
        return Err(ConfigError::new(
            "root",
            "root phrase must declare at least one sub-phrase".to_string(),
        ));
    }

    let mut doc = Document::new_root(root.clone());
    let mut stack: Vec<Frame> = vec![Frame {
        node: TokenIdx::ROOT,
        phrase: root,
    }];
    let mut coord = Coord::origin();
    let debug: Log<&'static str> = Log::None;
    // Set right after a phrase's node closes to that phrase's `suffix_phrases()`; folded into
    // the very next candidate-collection pass alongside the reopened parent's `sub_phrases()`,
    // then cleared regardless of whether anything from it won (a one-shot window attached to
    // the closing node, not a standing addition to the parent's grammar).
    let mut pending_suffix: Vec<PhraseRef> = Vec::new();

    for row_text in &rows {
        let mut consumed_in_row = 0usize;
        // Start of the span not yet flushed into a committed token. A masked winner extends
        // this span without flushing it; the next non-masked winner (or end of row) flushes
        // everything between `pending_start` and itself as one run, so masked content merges
        // into its neighbours rather than surfacing as its own token (spec mask invisibility).
        let mut pending_start = 0usize;
        let max_iterations = row_text.len() + stack.len() + 64;
        let mut iterations = 0usize;

        while consumed_in_row < row_text.len() {
            iterations += 1;
            if iterations > max_iterations {
                return Err(ConfigError::new(
                    "driver",
                    "parser exceeded its iteration budget for this row without making progress"
                        .to_string(),
                ));
            }

            let frame = stack.last().expect("root frame always present").clone();
            let unparsed = &row_text[consumed_in_row..];
            let scan_coord = coord.advance(&row_text[pending_start..consumed_in_row]);
            let stream = Stream::new(&doc, frame.node, unparsed, scan_coord.row, scan_coord.column);

            let end_candidate = frame.phrase.ends(&stream);
            debug.log_candidate(scan_coord, &end_candidate);

            let mut starts = Vec::new();
            for sub in frame.phrase.sub_phrases() {
                if let Some(mut c) = sub.starts(&stream) {
                    if c.phrase.is_none() {
                        c.phrase = Some(sub.clone());
                    }
                    starts.push(c);
                }
            }
            for sub in &pending_suffix {
                if let Some(mut c) = sub.starts(&stream) {
                    if c.phrase.is_none() {
                        c.phrase = Some(sub.clone());
                    }
                    starts.push(c);
                }
            }
            pending_suffix.clear();
            debug.log_candidate(scan_coord, &starts.first());

            validate_candidates(&end_candidate, &starts, unparsed.len(), &frame.phrase)?;

            match arbitrate(end_candidate, starts) {
                None => {
                    coord = attribute_gap(&mut doc, &frame, &row_text[pending_start..], coord);
                    consumed_in_row = row_text.len();
                    pending_start = row_text.len();
                }
                Some(candidate) if candidate.mask => {
                    // Mask candidates are dropped before commit (spec §3.4): no token is
                    // created for them at all, `at_confirmed`/`at_featurized` never fire, and
                    // a mask node's sub-phrases are never consulted (it simply isn't opened).
                    let was_null = candidate.is_null();
                    consumed_in_row += candidate.to;
                    if was_null && candidate.at == 0 {
                        unreachable!("arbitrate rejects a null non-end candidate at offset 0");
                    }
                }
                Some(candidate) => {
                    let was_null = candidate.is_null();
                    let is_end = matches!(candidate.shape, Shape::End);
                    let before = (stack.len(), stack.last().map(|f| f.node));

                    let (new_coord, new_consumed) = commit_candidate(
                        &mut doc,
                        &mut stack,
                        candidate,
                        row_text,
                        pending_start,
                        consumed_in_row,
                        coord,
                        &mut pending_suffix,
                    )?;
                    coord = new_coord;
                    consumed_in_row = new_consumed;
                    pending_start = new_consumed;

                    if was_null && !is_end {
                        let after = (stack.len(), stack.last().map(|f| f.node));
                        if after == before {
                            return Err(ConfigError::new(
                                "ForwardTo",
                                "a null candidate made no progress and carried no advancing feature"
                                    .to_string(),
                            ));
                        }
                    }
                }
            }
        }

        if pending_start < row_text.len() {
            let frame = stack.last().expect("root frame always present").clone();
            coord = attribute_gap(&mut doc, &frame, &row_text[pending_start..], coord);
        }
        coord = coord.next_row();
    }

    finalize(&mut doc, &mut stack, coord);
    Ok(doc)
}

fn validate_candidates(
    end: &Option<Candidate>,
    starts: &[Candidate],
    len: usize,
    phrase: &PhraseRef,
) -> Result<(), ConfigError> {
    let check = |c: &Candidate| -> Result<(), ConfigError> {
        if c.at > c.to || c.to > len {
            return Err(ConfigError::new(
                "candidate",
                format!(
                    "phrase `{}` returned a candidate with span [{}, {}) over a {}-byte window",
                    phrase.name(),
                    c.at,
                    c.to,
                    len
                ),
            ));
        }
        Ok(())
    };
    if let Some(c) = end {
        check(c)?;
    }
    for c in starts {
        check(c)?;
    }
    Ok(())
}

fn class_rank(c: &Candidate) -> u8 {
    match (c.shape, c.instant) {
        (Shape::End, true) => 0,
        (Shape::Node, true) => 1,
        (Shape::Plain, true) => 2,
        (Shape::End, false) => 3,
        _ => 4,
    }
}

/// Implements the priority arbitration of candidate matches: instant-class dominance, minimum
/// `at`, null-token preference (rejecting a null non-end candidate anchored at offset 0 unless
/// it carries a `ForwardTo`), longest content, then class precedence.
fn arbitrate(end: Option<Candidate>, starts: Vec<Candidate>) -> Option<Candidate> {
    let defer_end = end.as_ref().map(|c| c.default_end).unwrap_or(false) && !starts.is_empty();

    let mut pool: Vec<Candidate> = starts;
    if let Some(end) = end {
        if !defer_end {
            pool.push(end);
        }
    }

    pool.retain(|c| {
        let rejected_null_start = c.is_null()
            && c.at == 0
            && !matches!(c.shape, Shape::End)
            && !c.features.iter().any(|f| matches!(f, Feature::ForwardTo(_)));
        !rejected_null_start
    });

    if pool.is_empty() {
        return None;
    }

    // An instant end pre-empts every other candidate unconditionally, including a same-pass
    // instant node/standalone at a smaller `at` — rules 2-5 below never get a say once one
    // exists. At most one end candidate is ever in the pool, so there's nothing to rank it
    // against within its own class.
    if let Some(pos) = pool.iter().position(|c| c.instant && matches!(c.shape, Shape::End)) {
        return Some(pool.swap_remove(pos));
    }

    if pool.iter().any(|c| c.instant) {
        pool.retain(|c| c.instant);
    }

    let min_at = pool.iter().map(|c| c.at).min().unwrap();
    pool.retain(|c| c.at == min_at);

    if pool.iter().any(|c| c.is_null()) {
        pool.retain(|c| c.is_null());
    }

    let max_len = pool.iter().map(|c| c.to - c.at).max().unwrap();
    pool.retain(|c| c.to - c.at == max_len);

    pool.sort_by_key(class_rank);
    pool.into_iter().next()
}

/// Attribute `text` (a span with no winning candidate inside it) to `frame.node`, repeatedly
/// consulting `tokenize` for typed slices and falling back to untyped plain tokens in between.
fn attribute_gap(doc: &mut Document, frame: &Frame, text: &str, mut coord: Coord) -> Coord {
    if text.is_empty() {
        return coord;
    }
    let o_token = frame.node == TokenIdx::ROOT;
    let mut ts = TokenizeStream::new(text);
    let mut untyped_start = 0usize;

    while ts.consumed < text.len() {
        let before = ts.consumed;
        match frame.phrase.tokenize(&mut ts) {
            Some(id) => {
                if before > untyped_start {
                    let slice = &text[untyped_start..before];
                    doc.push_plain(frame.node, slice, coord, coord.advance(slice), None, o_token);
                    coord = coord.advance(slice);
                }
                let slice = &text[before..ts.consumed];
                doc.push_plain(frame.node, slice, coord, coord.advance(slice), Some(id), false);
                coord = coord.advance(slice);
                untyped_start = ts.consumed;
            }
            None => {
                if ts.consumed == before {
                    break;
                }
            }
        }
    }

    if untyped_start < text.len() {
        let slice = &text[untyped_start..];
        doc.push_plain(frame.node, slice, coord, coord.advance(slice), None, o_token);
        coord = coord.advance(slice);
    }
    coord
}

fn commit_candidate(
    doc: &mut Document,
    stack: &mut Vec<Frame>,
    candidate: Candidate,
    row_text: &str,
    flush_from: usize,
    consumed_in_row: usize,
    coord: Coord,
    pending_suffix: &mut Vec<PhraseRef>,
) -> Result<(Coord, usize), ConfigError> {
    let frame = stack.last().expect("root frame always present").clone();
    let abs_at = consumed_in_row + candidate.at;
    let abs_to = consumed_in_row + candidate.to;

    let mut coord = if abs_at > flush_from {
        attribute_gap(doc, &frame, &row_text[flush_from..abs_at], coord)
    } else {
        coord
    };

    let mut cursor = abs_at;
    if let Some(n) = candidate.features.iter().find_map(|f| match f {
        Feature::LStrip(n) => Some(*n),
        _ => None,
    }) {
        let slice = &row_text[cursor..cursor + n];
        doc.push_plain(
            frame.node,
            slice,
            coord,
            coord.advance(slice),
            None,
            frame.node == TokenIdx::ROOT,
        );
        coord = coord.advance(slice);
        cursor += n;
    }

    let match_text = &row_text[cursor..abs_to];
    let start_coord = coord;
    let end_coord = coord.advance(match_text);

    // The phrase that actually produced the committed token, not whichever phrase happened to
    // be active beforehand: a node's own governing phrase, the wrapped candidate's phrase for a
    // wrap, the matching sub-phrase for a standalone plain token, or the active phrase for an
    // end (there's nothing else it could be — `ends()` is only ever queried on the active one).
    let source_phrase: PhraseRef;

    let committed = match candidate.shape {
        Shape::End => {
            source_phrase = frame.phrase.clone();
            commit_end(doc, stack, match_text, start_coord, end_coord, pending_suffix)?
        }
        Shape::Node if candidate.wraps.is_some() => {
            source_phrase = candidate
                .wraps
                .as_ref()
                .and_then(|w| w.phrase.clone())
                .ok_or_else(|| {
                    ConfigError::new("candidate", "wrapped candidate is missing its phrase".to_string())
                })?;
            commit_wrap(doc, stack, &frame, candidate.clone(), match_text, start_coord, end_coord)?
        }
        Shape::Node => {
            let phrase = candidate.phrase.clone().ok_or_else(|| {
                ConfigError::new("candidate", "node candidate is missing its phrase".to_string())
            })?;
            source_phrase = phrase.clone();
            let idx = doc.open_node(
                frame.node,
                phrase.clone(),
                match_text,
                start_coord,
                end_coord,
                candidate.id,
            );
            stack.push(Frame { node: idx, phrase });
            idx
        }
        Shape::Plain => {
            source_phrase = candidate.phrase.clone().unwrap_or_else(|| frame.phrase.clone());
            doc.push_plain(
                frame.node,
                match_text,
                start_coord,
                end_coord,
                candidate.id,
                frame.node == TokenIdx::ROOT && candidate.id.is_none(),
            )
        }
    };

    source_phrase.at_confirmed(doc.view(committed));

    let mut coord_after = end_coord;
    let mut cursor_after = abs_to;
    for feature in &candidate.features {
        match feature {
            Feature::LStrip(_) => {}
            Feature::RTokenize(n) => {
                let active = stack.last().expect("root frame always present").clone();
                let end = (cursor_after + n).min(row_text.len());
                let span = &row_text[cursor_after..end];
                coord_after = attribute_gap(doc, &active, span, coord_after);
                cursor_after = end;
            }
            Feature::SwitchTo(p) => {
                if let Some(top) = stack.last_mut() {
                    top.phrase = p.clone();
                }
            }
            Feature::SwitchPh(p) => {
                if let Some(top) = stack.last_mut() {
                    top.phrase = p.clone();
                    doc.set_phrase(top.node, p.clone());
                }
            }
            Feature::ForwardTo(target) => match stack.iter().position(|f| f.node == *target) {
                Some(p) => stack.truncate(p + 1),
                None => {
                    return Err(ConfigError::new(
                        "ForwardTo",
                        "forwarding target is not an open ancestor node".to_string(),
                    ))
                }
            },
        }
    }

    source_phrase.at_featurized(doc.view(committed));

    if matches!(candidate.shape, Shape::Node) && candidate.wraps.is_none() {
        if let Some(top) = stack.last() {
            if top.node == committed {
                top.phrase.at_start(NodeHandle {
                    doc,
                    idx: committed,
                });
            }
        }
    }

    Ok((coord_after, cursor_after))
}

fn commit_end(
    doc: &mut Document,
    stack: &mut Vec<Frame>,
    content: &str,
    start: Coord,
    end: Coord,
    pending_suffix: &mut Vec<PhraseRef>,
) -> Result<TokenIdx, ConfigError> {
    let frame = stack.pop().expect("root frame always present");
    if stack.is_empty() {
        stack.push(frame);
        return Err(ConfigError::new(
            "driver",
            "the root node cannot be closed by an end candidate".to_string(),
        ));
    }
    let end_idx = doc.close_node(frame.node, EndKind::Real, content, start, end);
    frame.phrase.at_end(NodeHandle {
        doc,
        idx: frame.node,
    });
    *pending_suffix = frame.phrase.suffix_phrases().to_vec();
    Ok(end_idx)
}

fn commit_wrap(
    doc: &mut Document,
    stack: &mut Vec<Frame>,
    frame: &Frame,
    candidate: Candidate,
    match_text: &str,
    start: Coord,
    end: Coord,
) -> Result<TokenIdx, ConfigError> {
    let wrapper_phrase = candidate.phrase.ok_or_else(|| {
        ConfigError::new(
            "candidate",
            "wrapping candidate is missing its wrapper phrase".to_string(),
        )
    })?;
    let wrapper_idx = doc.open_node(frame.node, wrapper_phrase.clone(), "", start, start, None);
    stack.push(Frame {
        node: wrapper_idx,
        phrase: wrapper_phrase,
    });

    let inner = *candidate.wraps.ok_or_else(|| {
        ConfigError::new(
            "candidate",
            "wrapping candidate carries no wrapped candidate".to_string(),
        )
    })?;
    let inner_phrase = inner.phrase.ok_or_else(|| {
        ConfigError::new("candidate", "wrapped candidate is missing its phrase".to_string())
    })?;
    let inner_idx = doc.open_node(
        wrapper_idx,
        inner_phrase.clone(),
        match_text,
        start,
        end,
        inner.id,
    );
    stack.push(Frame {
        node: inner_idx,
        phrase: inner_phrase.clone(),
    });
    inner_phrase.at_start(NodeHandle {
        doc,
        idx: inner_idx,
    });

    Ok(inner_idx)
}

fn finalize(doc: &mut Document, stack: &mut Vec<Frame>, coord: Coord) {
    while stack.len() > 1 {
        let frame = stack.pop().unwrap();
        doc.close_node(frame.node, EndKind::Open, "", coord, coord);
    }
    let root = stack.pop().expect("root frame always present");
    doc.close_node(root.node, EndKind::Eof, "", coord, coord);
}
