//! Control flow graph integration tests.
//!
//! These tests drive the graph surgery API the way a transformation pass
//! would and check the edge invariants after every step:
//! 1. Successor and predecessor multisets stay exact inverses
//! 2. Block destruction reroutes predecessors and leaves nothing behind
//! 3. Edge changes invalidate the dominator trees

use flowir::{
    ir::{ArithOp, BlockId, Function, Instruction},
    Result,
};

/// Minimal deterministic generator for mutation sequences.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) as usize) % bound
    }
}

fn assert_consistent(fun: &Function) {
    assert_eq!(
        fun.edge_inconsistency(),
        None,
        "edge lists out of sync in {fun:#?}"
    );
}

#[test]
fn test_edge_symmetry_under_random_mutation() {
    let mut rng = Lcg(0x5eed);
    let mut fun = Function::new();
    let cond = fun.add_register("c");
    let mut blocks: Vec<BlockId> = vec![fun.entry_block(), fun.exit_block()];
    for _ in 0..8 {
        blocks.push(fun.add_block());
    }

    let mut branches = Vec::new();
    let mut raw_edges = Vec::new();

    for _ in 0..2_000 {
        let a = blocks[rng.next(blocks.len())];
        let b = blocks[rng.next(blocks.len())];

        match rng.next(6) {
            0 => {
                fun.add_successor(a, b);
                raw_edges.push((a, b));
            }
            1 => {
                if let Some((from, to)) = raw_edges.pop() {
                    assert!(fun.remove_successor(from, to));
                }
            }
            2 => fun.set_fall_through(a, Some(b)),
            3 => fun.set_fall_through(a, None),
            4 => branches.push(fun.append_new(a, Instruction::cond_branch(cond, b))),
            _ => {
                if let Some(insn) = branches.pop() {
                    fun.delete_instruction(insn);
                }
            }
        }

        assert_consistent(&fun);
    }
}

#[test]
fn test_parallel_edges_are_a_multiset() {
    let mut fun = Function::new();
    let a = fun.add_block();
    let b = fun.add_block();

    fun.add_successor(a, b);
    fun.add_successor(a, b);
    assert!(fun.remove_successor(a, b));

    assert_eq!(fun.block(a).unwrap().successor_count(b), 1);
    assert_eq!(fun.block(b).unwrap().predecessor_count(a), 1);
    assert_consistent(&fun);
}

#[test]
fn test_destroy_redirects_every_predecessor() {
    let mut fun = Function::new();
    let p1 = fun.add_block();
    let p2 = fun.add_block();
    let victim = fun.add_block();
    let target = fun.add_block();
    let cond = fun.add_register("c");

    fun.set_fall_through(p1, Some(victim));
    fun.append_new(p2, Instruction::cond_branch(cond, victim));
    fun.set_fall_through(p2, Some(fun.exit_block()));
    fun.set_fall_through(victim, Some(target));

    fun.destroy_block(victim);

    assert!(!fun.contains_block(victim));
    assert_eq!(fun.block(p1).unwrap().fall_through(), Some(target));
    assert_eq!(fun.block(p2).unwrap().successor_count(target), 1);
    assert_eq!(
        fun.block_instructions(p2)
            .filter_map(Instruction::branch_target)
            .collect::<Vec<_>>(),
        [target]
    );
    assert_eq!(fun.block(target).unwrap().predecessors().len(), 2);
    assert_consistent(&fun);
}

#[test]
fn test_destroy_self_loop_entry() -> Result<()> {
    let text = "\
fun f {
entry:
  reg a
  reg b
  c := a + b
  if (c) goto done
  goto entry
done:
  nop
}
";
    let mut prog = flowir::ir::Program::parse(text)?;
    let fun = prog.function_mut("f").unwrap();
    let entry = fun.entry_block();
    let done = fun.block(entry).unwrap().successors()[0];

    fun.destroy_block(entry);

    assert!(!fun.contains_block(entry));
    assert_eq!(fun.block_count(), 2);
    assert!(fun.block(done).unwrap().predecessors().is_empty());
    assert_consistent(fun);
    Ok(())
}

#[test]
fn test_destroy_chain_back_to_front() {
    let mut fun = Function::new();
    let a = fun.add_block();
    let b = fun.add_block();
    let c = fun.add_block();
    let exit = fun.exit_block();
    let x = fun.add_register("x");

    fun.set_fall_through(fun.entry_block(), Some(a));
    fun.set_fall_through(a, Some(b));
    fun.set_fall_through(b, Some(c));
    fun.set_fall_through(c, Some(exit));
    fun.append_new(b, Instruction::arith(ArithOp::Mul, x, x, x));

    for bb in [c, b, a] {
        fun.destroy_block(bb);
        assert_consistent(&fun);
    }

    let entry = fun.block(fun.entry_block()).unwrap();
    assert_eq!(entry.fall_through(), Some(exit));
    assert_eq!(entry.successors(), &[exit]);
    assert_eq!(fun.block_ids(), &[fun.entry_block(), exit]);
}

#[test]
fn test_dominator_trees_follow_edges() {
    let mut fun = Function::new();
    let (entry, exit) = (fun.entry_block(), fun.exit_block());
    let body = fun.add_block();

    fun.set_fall_through(entry, Some(body));
    fun.set_fall_through(body, Some(exit));

    let dom = fun.dominator_tree_mut();
    dom.insert(entry, None);
    dom.insert(body, Some(entry));
    dom.insert(exit, Some(body));
    dom.mark_valid();
    fun.post_dominator_tree_mut().mark_valid();

    assert!(fun.dominator_tree().dominates(entry, exit));

    fun.destroy_block(body);

    assert!(!fun.dominator_tree().is_valid());
    assert!(!fun.post_dominator_tree().is_valid());
    assert!(!fun.dominator_tree().contains(body));
    assert_eq!(fun.dominator_tree().immediate_dominator(exit), None);
}

#[test]
#[should_panic(expected = "use of destroyed or foreign block")]
fn test_destroyed_handle_is_fatal() {
    let mut fun = Function::new();
    let bb = fun.add_block();
    fun.destroy_block(bb);
    fun.set_fall_through(bb, None);
}
