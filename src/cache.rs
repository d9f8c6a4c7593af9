//! Process-wide memoization for shape-derived data.
//!
//! `strides_for_shape`, `merged_dims`, and `identity_view` are pure
//! functions of their inputs and are called repeatedly with the same
//! handful of shapes as a compiler lowers many tensor operations. The
//! donor ecosystem's idiom for this kind of read-mostly process-wide
//! cache is a `once_cell::sync::Lazy` static guarding a `RwLock`
//! (see `brevis-network-pico`'s `GLOBAL_MEMORY_POOL`): concurrent
//! readers don't contend with each other, and writers (cache misses)
//! are serialized. No eviction: the key space is bounded by the set of
//! shapes a program actually uses.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use crate::view::View;

type Shape = Vec<i64>;
type Strides = Vec<i64>;

static STRIDES_FOR_SHAPE: Lazy<RwLock<HashMap<Shape, Arc<[i64]>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

static MERGED_DIMS: Lazy<RwLock<HashMap<(Shape, Strides), Arc<[(i64, i64)]>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

static IDENTITY_VIEW: Lazy<RwLock<HashMap<Shape, View>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Row-major strides for `shape`, treating length-1 dims as stride-0
/// wildcards (the normalization `View::new` applies anyway; computed
/// here so callers that only need strides don't have to build a view).
pub fn strides_for_shape(shape: &[i64]) -> Arc<[i64]> {
    if cfg!(feature = "memoize") {
        if let Some(hit) = STRIDES_FOR_SHAPE.read().unwrap().get(shape) {
            return hit.clone();
        }
    }
    let computed: Arc<[i64]> = compute_strides_for_shape(shape).into();
    if cfg!(feature = "memoize") {
        STRIDES_FOR_SHAPE
            .write()
            .unwrap()
            .insert(shape.to_vec(), computed.clone());
    }
    computed
}

fn compute_strides_for_shape(shape: &[i64]) -> Vec<i64> {
    let mut strides = vec![0i64; shape.len()];
    let mut acc = 1i64;
    for i in (0..shape.len()).rev() {
        strides[i] = if shape[i] == 1 { 0 } else { acc };
        acc *= shape[i];
    }
    strides
}

/// Coalesced `(size, stride)` pairs for a shape/strides pair, in the
/// same dimension order as `shape` itself (index 0 = slowest-varying,
/// last index = fastest-varying, as is conventional for row-major
/// tensors). Adjacent dims `i-1, i` merge when `stride[i-1] ==
/// size[i]*stride[i]`; size-1 dims and stride-0 runs are absorbed into
/// their neighbor. `View::expr_node` walks the result in reverse
/// (fastest-varying first).
pub fn merged_dims(shape: &[i64], strides: &[i64]) -> Arc<[(i64, i64)]> {
    let key = (shape.to_vec(), strides.to_vec());
    if cfg!(feature = "memoize") {
        if let Some(hit) = MERGED_DIMS.read().unwrap().get(&key) {
            return hit.clone();
        }
    }
    let computed: Arc<[(i64, i64)]> = compute_merged_dims(shape, strides).into();
    if cfg!(feature = "memoize") {
        MERGED_DIMS.write().unwrap().insert(key, computed.clone());
    }
    computed
}

fn compute_merged_dims(shape: &[i64], strides: &[i64]) -> Vec<(i64, i64)> {
    if shape.is_empty() {
        return Vec::new();
    }
    let mut merged: Vec<(i64, i64)> = vec![(shape[0], strides[0])];
    for i in 1..shape.len() {
        let (size, stride) = (shape[i], strides[i]);
        let (prev_size, prev_stride) = *merged.last().unwrap();
        let mergeable = (stride != 0 && prev_stride == size * stride)
            || prev_size == 1
            || (stride == 0 && prev_stride == 0);
        if mergeable {
            let last = merged.last_mut().unwrap();
            last.0 *= size;
            last.1 = stride;
        } else {
            merged.push((size, stride));
        }
    }
    merged
}

/// The identity view for `shape`: row-major strides, zero offset.
pub fn identity_view(shape: &[i64]) -> View {
    if cfg!(feature = "memoize") {
        if let Some(hit) = IDENTITY_VIEW.read().unwrap().get(shape) {
            return hit.clone();
        }
    }
    let strides = strides_for_shape(shape).to_vec();
    let view = View::new(shape.to_vec(), strides, 0);
    if cfg!(feature = "memoize") {
        IDENTITY_VIEW
            .write()
            .unwrap()
            .insert(shape.to_vec(), view.clone());
    }
    view
}
