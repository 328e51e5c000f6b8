/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

A succinct partial compacted trie based on a recursive bitstream.

Instances of this structure represent a *partial compacted trie* (PaCo
trie) over a sparse set of *delimiters* drawn from a sorted key set: one
delimiter per `bucket_size` keys, chosen as the shortest key seen since the
previous delimiter so that compacted paths stay short. The trie serves as a
*distributor*: [`rank`](PacoTrieDistributor::rank) returns how many
delimiters strictly precede a key, that is, the index of the bucket the key
belongs to.

In a partial compacted trie just a prefix of the path at each node is
actually stored: the number of elided bits is recorded instead. The prefix
kept at each node is the smallest one that still ranks correctly *every*
key of the original set, not just the delimiters; depending on the keys,
the savings can be substantial.

The trie is stored as a *recursive bitstream*: a node with subtrees *A* and
*B* is encoded as

> *skip* *pathlen* *path* *missing* *leaves*<sub>*A*</sub> *A* *B*,

where except for *path*, which is stored literally in 64-bit chunks, all
components are in δ coding, and the last two are the recursive encodings of
the subtrees. Leaves are distinguished by having *skip* (the bit length of
the encoding of *A*) equal to zero, in which case nothing after the path is
recorded. Queries walk the bitstream directly, skipping the encoding of
left subtrees that are irrelevant to the searched key; no node objects are
ever materialized.

The explicit trie built at construction time lives in an arena of node
records addressed by index, and both serialization passes are iterative
with explicit stacks, so that keys with very long paths cannot overflow the
call stack.

*/

use std::borrow::Borrow;
use std::marker::PhantomData;

use dsi_progress_logger::*;
use epserde::*;
use mem_dbg::*;

use crate::bits::{BitTransform, BitVec};
use crate::mph::BuildError;
use crate::utils::{len_delta, BitReader, BitWriter};

/// Infinity-like value for initializing node prefixes. It's one less than
/// `usize::MAX` because we need to be able to add one without overflowing.
const MAX_PREFIX: usize = usize::MAX - 1;

/// A node of the construction-time trie.
///
/// Children are always both present or both absent.
#[derive(Debug)]
struct Node {
    left: Option<usize>,
    right: Option<usize>,
    /// The path compacted in this node.
    path: BitVec,
    /// The length of the minimum disambiguating prefix on the left.
    prefix_left: usize,
    /// The length of the minimum disambiguating prefix on the right.
    prefix_right: usize,
}

impl Node {
    fn new(left: Option<usize>, right: Option<usize>, path: BitVec) -> Self {
        Self {
            left,
            right,
            path,
            prefix_left: MAX_PREFIX,
            prefix_right: MAX_PREFIX,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Per-node data computed by the sizing pass.
#[derive(Debug, Clone, Copy, Default)]
struct NodeCode {
    /// The number of path bits actually stored.
    retained: usize,
    /// The number of path bits elided.
    missing: usize,
    /// The number of leaves in the subtree.
    leaves: usize,
    /// The bit length of the encoding of the subtree.
    enc_bits: usize,
}

/// The explicit trie built over the delimiters, discarded after
/// serialization.
struct PartialTrie {
    nodes: Vec<Node>,
    root: Option<usize>,
    /// The offset of each delimiter in the original key sequence.
    offsets: Vec<u64>,
}

impl PartialTrie {
    fn push_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn set_offset(&mut self, index: usize, value: u64) {
        if self.offsets.len() <= index {
            self.offsets.resize(index + 1, 0);
        }
        self.offsets[index] = value;
    }

    /// First pass: select delimiters and insert them into a compacted
    /// binary trie, checking that keys are distinct, sorted and
    /// prefix-free.
    fn insert_delimiters(
        &mut self,
        keys: impl Iterator<Item = BitVec>,
        bucket_size: usize,
    ) -> Result<usize, BuildError> {
        let mut keys = keys;
        let Some(first) = keys.next() else {
            return Ok(0);
        };

        let mut prev = first.clone();
        // The shortest key seen since the last commit.
        let mut shortest = first;
        // The last delimiter inserted, if the root exists.
        let mut prev_delimiter = BitVec::new();
        let mut count = 1;

        for curr in keys {
            match prev.cmp(&curr) {
                std::cmp::Ordering::Equal => return Err(BuildError::DuplicateKey { pos: count }),
                std::cmp::Ordering::Greater => return Err(BuildError::NotSorted { pos: count }),
                std::cmp::Ordering::Less => {}
            }
            if curr.longest_common_prefix(&prev) == prev.len() {
                return Err(BuildError::NotPrefixFree { pos: count });
            }

            if count % bucket_size == 0 {
                // Found a delimiter. Insert it into the trie.
                match self.root {
                    None => {
                        let root = self.push_node(Node::new(None, None, shortest.clone()));
                        self.root = Some(root);
                    }
                    Some(root) => {
                        let mut prefix = shortest.longest_common_prefix(&prev_delimiter);
                        let mut pos = 0;
                        let mut node = Some(root);
                        let mut inserted = false;

                        while let Some(idx) = node {
                            let path_len = self.nodes[idx].path.len();
                            if prefix < path_len {
                                // Split: the old continuation becomes the
                                // left child, the new delimiter's remainder
                                // the right one.
                                let continuation = Node::new(
                                    self.nodes[idx].left,
                                    self.nodes[idx].right,
                                    self.nodes[idx].path.sub_vec(prefix + 1..path_len),
                                );
                                let continuation = self.push_node(continuation);
                                let leaf = self.push_node(Node::new(
                                    None,
                                    None,
                                    shortest.sub_vec(pos + prefix + 1..shortest.len()),
                                ));
                                let split = &mut self.nodes[idx];
                                split.path.truncate(prefix);
                                split.left = Some(continuation);
                                split.right = Some(leaf);
                                inserted = true;
                                break;
                            }

                            // Delimiters grow lexicographically, so the
                            // walk stays on the right spine.
                            debug_assert!(prefix > path_len);
                            prefix -= path_len + 1;
                            pos += path_len + 1;
                            node = self.nodes[idx].right;
                        }

                        debug_assert!(inserted);
                    }
                }

                prev_delimiter = shortest.clone();
                shortest = curr.clone();
                self.set_offset(count / bucket_size, count as u64);
            }

            if curr.len() < shortest.len() {
                shortest = curr.clone();
                self.set_offset(count / bucket_size, count as u64);
            }

            prev = curr;
            count += 1;
        }

        let num_delimiters = (count - 1) / bucket_size;
        self.offsets.resize(num_delimiters, 0);
        Ok(count)
    }

    /// Second pass: walk every key down the trie and record, per node, the
    /// shortest path prefix that still discriminates the key set.
    ///
    /// A key diverging to the left of a node tightens `prefix_left` every
    /// time (keys arrive in increasing order, so the last one is the
    /// closest); a key diverging to the right sets `prefix_right` only
    /// *once*, since only the closest right-discriminating key matters.
    fn reduce_paths(&mut self, keys: impl Iterator<Item = BitVec>) {
        let Some(root) = self.root else {
            return;
        };

        // The nodes visited by the previous key, with the length of the
        // trie path leading to each of them; reused across keys by cutting
        // back to the longest common prefix.
        let mut stack = vec![root];
        let mut lens = vec![0];
        let mut prev = BitVec::new();
        let mut first = true;

        for curr in keys {
            if !first {
                let prefix = prev.longest_common_prefix(&curr);
                while stack.len() > 1 && lens[stack.len() - 1] > prefix {
                    stack.pop();
                    lens.pop();
                }
            } else {
                first = false;
            }

            let mut node = *stack.last().unwrap();
            let mut pos = lens[lens.len() - 1];
            loop {
                let path_len = self.nodes[node].path.len();
                let prefix = curr.longest_common_prefix_at(pos, &self.nodes[node].path);
                if prefix < path_len {
                    let n = &mut self.nodes[node];
                    if n.path.get(prefix) {
                        n.prefix_left = prefix;
                    } else if n.prefix_right == MAX_PREFIX {
                        n.prefix_right = prefix;
                    }
                    break;
                }

                pos += path_len + 1;
                if pos > curr.len() {
                    break;
                }
                let next = if curr.get(pos - 1) {
                    self.nodes[node].right
                } else {
                    self.nodes[node].left
                };
                // Prefix-free keys always diverge before falling off a leaf.
                debug_assert!(next.is_some());
                let Some(next) = next else { break };
                node = next;
                stack.push(node);
                lens.push(pos);
            }

            prev = curr;
        }
    }

    /// Post-order sizing pass: compute, per node, the retained path length,
    /// the number of elided bits, the subtree leaf count and the encoded
    /// bit length, so that skips are known before emission.
    fn size_subtrees(&self) -> (Vec<NodeCode>, i64) {
        let mut codes = vec![NodeCode::default(); self.nodes.len()];
        let mut gain: i64 = 0;
        let Some(root) = self.root else {
            return (codes, gain);
        };

        let mut stack = vec![(root, false)];
        while let Some((idx, children_done)) = stack.pop() {
            let node = &self.nodes[idx];
            if !children_done {
                stack.push((idx, true));
                if let Some(right) = node.right {
                    stack.push((right, false));
                }
                if let Some(left) = node.left {
                    stack.push((left, false));
                }
                continue;
            }

            let path_len = node.path.len();
            let retained = path_len.min(node.prefix_left.max(node.prefix_right) + 1);
            let missing = path_len - retained;
            // One bit gained per elided path bit, plus whatever the
            // truncated length saves in δ coding.
            gain += missing as i64;
            gain += len_delta(path_len as u64) as i64 - len_delta(retained as u64) as i64;

            let mut code = NodeCode {
                retained,
                missing,
                leaves: 1,
                enc_bits: len_delta(0) + len_delta(retained as u64) + retained,
            };
            if let (Some(left), Some(right)) = (node.left, node.right) {
                let (lc, rc) = (codes[left], codes[right]);
                code.leaves = lc.leaves + rc.leaves;
                code.enc_bits = len_delta(lc.enc_bits as u64)
                    + len_delta(retained as u64)
                    + retained
                    + len_delta(missing as u64)
                    + len_delta(lc.leaves as u64)
                    + lc.enc_bits
                    + rc.enc_bits;
                gain -= len_delta(missing as u64) as i64;
            } else {
                debug_assert!(node.is_leaf());
            }
            codes[idx] = code;
        }

        (codes, gain)
    }

    /// Pre-order emission pass: write the recursive bitstream, left
    /// subtree before right, using the precomputed skips.
    fn emit(&self, codes: &[NodeCode], writer: &mut BitWriter) {
        let Some(root) = self.root else {
            return;
        };

        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            let code = &codes[idx];
            match (node.left, node.right) {
                (Some(left), Some(right)) => {
                    writer.write_delta(codes[left].enc_bits as u64);
                    writer.write_delta(code.retained as u64);
                    Self::emit_path(&node.path, code.retained, writer);
                    writer.write_delta(code.missing as u64);
                    writer.write_delta(codes[left].leaves as u64);
                    stack.push(right);
                    stack.push(left);
                }
                (None, None) => {
                    // Leaves are marked by a zero skip; nothing after the
                    // path is recorded.
                    writer.write_delta(0);
                    writer.write_delta(code.retained as u64);
                    Self::emit_path(&node.path, code.retained, writer);
                }
                _ => unreachable!("trie nodes are always binary"),
            }
        }
    }

    /// The path is written in 64-bit chunks exactly as it is laid out in a
    /// [`BitVec`], so that queries can compare whole words.
    fn emit_path(path: &BitVec, retained: usize, writer: &mut BitWriter) {
        let mut i = 0;
        while i < retained {
            let width = 64.min(retained - i);
            writer.write_bits(path.get_bits(i, width), width);
            i += width;
        }
    }
}

/// A succinct distributor ranking keys against the delimiters of a sorted
/// key set.
#[derive(Epserde, Debug, Clone, MemDbg, MemSize)]
pub struct PacoTrieDistributor<T: ?Sized, TR> {
    /// The bitstream representing the PaCo trie.
    trie: BitVec,
    /// The number of leaves in the trie.
    num_leaves: usize,
    /// The offset of each delimiter in the original key sequence.
    offsets: Box<[u64]>,
    /// The transformation used to map keys to bit vectors.
    transform: TR,
    _marker: PhantomData<T>,
}

impl<T: ?Sized, TR: BitTransform<T>> PacoTrieDistributor<T, TR> {
    /// Build a distributor over the given keys, with one delimiter every
    /// `bucket_size` keys.
    ///
    /// The keys must be distinct, sorted and prefix-free once transformed;
    /// the iterable is scanned twice, and must yield the same keys in the
    /// same order both times.
    pub fn new<I>(
        keys: I,
        bucket_size: usize,
        transform: TR,
        pl: &mut impl ProgressLog,
    ) -> Result<Self, BuildError>
    where
        I: IntoIterator + Clone,
        I::Item: Borrow<T>,
    {
        assert!(bucket_size > 0);

        let mut trie = PartialTrie {
            nodes: vec![],
            root: None,
            offsets: vec![],
        };

        pl.item_name("key");
        pl.start("Scanning keys and inserting delimiters...");
        let num_keys = trie.insert_delimiters(
            keys.clone()
                .into_iter()
                .map(|key| transform.to_bit_vec(key.borrow())),
            bucket_size,
        )?;
        pl.done_with_count(num_keys);

        pl.start("Reducing paths...");
        trie.reduce_paths(
            keys.into_iter()
                .map(|key| transform.to_bit_vec(key.borrow())),
        );
        pl.done_with_count(num_keys);

        let (codes, gain) = trie.size_subtrees();
        let mut writer = BitWriter::new();
        trie.emit(&codes, &mut writer);
        let num_leaves = trie.root.map_or(0, |root| codes[root].leaves);
        debug_assert_eq!(num_leaves, trie.offsets.len());

        pl.info(format_args!(
            "Trie bit size: {}; gain: {}",
            writer.len(),
            gain
        ));

        Ok(Self {
            trie: writer.into_bit_vec(),
            num_leaves,
            offsets: trie.offsets.into_boxed_slice(),
            transform,
            _marker: PhantomData,
        })
    }

    /// Return the number of delimiters strictly smaller than `key`.
    pub fn rank(&self, key: &T) -> usize {
        self.rank_bit_vec(&self.transform.to_bit_vec(key))
    }

    /// Return the number of delimiters strictly smaller than the given
    /// bit-vector view of a key.
    pub fn rank_bit_vec(&self, v: &BitVec) -> usize {
        if self.num_leaves == 0 {
            return 0;
        }

        let length = v.len();
        let mut reader = BitReader::new(&self.trie);
        let mut pos = 0;
        let mut leaves_on_the_left = 0;
        let mut leaves = self.num_leaves;

        loop {
            let skip = reader.read_delta() as usize;
            let path_len = reader.read_delta() as usize;

            // Compare the key against the stored path, one word at a time.
            // `pos` tracks full chunks, so it may overshoot the key length;
            // the read itself is truncated and zero-extended.
            let mut xor = 0;
            let mut t = 0;
            let mut read = 0;
            while read < path_len {
                let width = 64.min(path_len - read);
                t = reader.read_bits(width);
                xor = v.get_bits(pos, width) ^ t;
                pos += width;
                read += width;
                if xor != 0 || pos >= length {
                    break;
                }
            }

            if xor != 0 || pos > length {
                // If the first differing bit is a one in the path, the key
                // is lexicographically smaller than everything below this
                // node; otherwise it is past this node, or past the whole
                // subtree if the node is internal.
                return if xor & xor.wrapping_neg() & t != 0 {
                    leaves_on_the_left
                } else if skip == 0 {
                    leaves_on_the_left + 1
                } else {
                    leaves_on_the_left + leaves
                };
            }

            if skip == 0 {
                // Exact path match on a leaf.
                return leaves_on_the_left;
            }

            if pos >= length {
                // The key ends on the path boundary.
                return leaves_on_the_left;
            }

            let missing = reader.read_delta() as usize;
            pos += missing;
            if pos >= length {
                // The key ends inside the elided gap.
                return leaves_on_the_left;
            }

            let leaves_in_left_subtree = reader.read_delta() as usize;

            if v.get(pos) {
                // Right: jump over the encoding of the left subtree.
                reader.skip(skip);
                leaves_on_the_left += leaves_in_left_subtree;
                leaves -= leaves_in_left_subtree;
            } else {
                leaves = leaves_in_left_subtree;
            }
            pos += 1;
        }
    }

    /// Return the number of leaves (delimiters) in this trie.
    #[inline(always)]
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Return the position in the original key sequence of the delimiter
    /// of given ordinal.
    #[inline(always)]
    pub fn offset(&self, ordinal: usize) -> u64 {
        self.offsets[ordinal]
    }

    /// Return the offsets of all delimiters in the original key sequence.
    #[inline(always)]
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Return the number of bits used by this structure.
    pub fn num_bits(&self) -> usize {
        self.trie.len() + self.transform.num_bits()
    }
}
