use classfile::instruction::{self as op, Instruction, Operands};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{btree_map::BTreeMap, BTreeSet, HashMap};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

/// How control leaves the last instruction of a basic block.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Jump<T> {
    Return,

    Unconditional(T),
    Branch(T),
    /// The first target is the default case.
    Switch(Vec<T>),
}

impl<T> Jump<T> {
    pub fn targets(&self) -> &[T] {
        match self {
            Jump::Return => &[],
            Jump::Unconditional(n) | Jump::Branch(n) => std::slice::from_ref(n),
            Jump::Switch(targets) => targets,
        }
    }

    pub fn map<U, F>(self, mut func: F) -> Jump<U>
    where
        F: FnMut(T) -> U,
    {
        match self {
            Jump::Return => Jump::Return,
            Jump::Unconditional(n) => Jump::Unconditional(func(n)),
            Jump::Branch(n) => Jump::Branch(func(n)),
            Jump::Switch(targets) => Jump::Switch(targets.into_iter().map(func).collect()),
        }
    }
}

/// Edge labels of the control flow graph.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Edge {
    Fallthrough,
    Taken,
    NotTaken,
    Case,
}

/// The jump an instruction performs, as absolute pcs.
pub fn get_jump_type(instruction: &Instruction<'_>) -> Option<Jump<usize>> {
    let pc = instruction.pc() as i64;
    let absolute = |offset: i32| (pc + offset as i64).max(0) as usize;

    Some(match instruction.opcode() {
        op::IRETURN..=op::RETURN | op::ATHROW | op::RET => Jump::Return,

        op::GOTO | op::GOTO_W => match instruction.operands().ok()? {
            Operands::Branch(offset) => Jump::Unconditional(absolute(offset)),
            _ => return None,
        },

        op::IFEQ..=op::IF_ACMPNE | op::IFNULL | op::IFNONNULL | op::JSR | op::JSR_W => {
            match instruction.operands().ok()? {
                Operands::Branch(offset) => Jump::Branch(absolute(offset)),
                _ => return None,
            }
        }

        op::TABLESWITCH | op::LOOKUPSWITCH => {
            let offsets = instruction.operands().ok()?.branch_offsets();
            Jump::Switch(offsets.into_iter().map(absolute).collect())
        }

        _ => return None,
    })
}

/// A run of instructions with a single entry and a single exit, as an
/// inclusive range of indices into the instruction listing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct BasicBlock {
    pub range: Range,
    /// Targets are indices into the instruction listing.
    pub jump: Option<Jump<usize>>,
}

/// Splits a decoded instruction listing into basic blocks. Jumps to pcs that
/// are not the start of an instruction are dropped.
pub fn create_control_flow_graph(instructions: &[Instruction<'_>]) -> DiGraph<BasicBlock, Edge> {
    let mut graph = DiGraph::new();
    if instructions.is_empty() {
        return graph;
    }

    // map of pc -> index
    let byte_map = instructions
        .iter()
        .enumerate()
        .map(|(idx, instruction)| (instruction.pc(), idx))
        .collect::<BTreeMap<_, _>>();

    let jumps = instructions
        .iter()
        .map(|instruction| {
            get_jump_type(instruction).map(|jump| {
                jump.map(|target| byte_map.get(&target).copied())
            })
        })
        .collect::<Vec<_>>();

    // Either the target of a jump, or the instruction after one.
    let mut headers = BTreeSet::new();
    headers.insert(0);
    for (idx, jump) in jumps.iter().enumerate() {
        if let Some(jump) = jump {
            if idx + 1 < instructions.len() {
                headers.insert(idx + 1);
            }
            headers.extend(jump.targets().iter().flatten().copied());
        }
    }

    let mut header_map = HashMap::new();
    let mut blocks = Vec::new();

    let ends = headers.iter().skip(1).copied().chain(Some(instructions.len()));
    for (current, next) in headers.iter().copied().zip(ends) {
        let jump = jumps[next - 1].clone().map(|jump| {
            let targets = jump.targets().iter().flatten().copied().collect::<Vec<_>>();
            match jump {
                Jump::Return => Jump::Return,
                Jump::Unconditional(_) => targets
                    .first()
                    .map_or(Jump::Return, |&target| Jump::Unconditional(target)),
                Jump::Branch(_) => targets
                    .first()
                    .map_or(Jump::Return, |&target| Jump::Branch(target)),
                Jump::Switch(_) => Jump::Switch(targets),
            }
        });

        let node = graph.add_node(BasicBlock {
            range: Range {
                start: current,
                end: next - 1,
            },
            jump,
        });
        header_map.insert(current, node);
        blocks.push(node);
    }

    for (i, &block) in blocks.iter().enumerate() {
        let next = blocks.get(i + 1).copied();
        let target = |idx: &usize| header_map.get(idx).copied();

        let edges: Vec<(NodeIndex, Edge)> = match &graph[block].jump {
            None => next.map(|next| (next, Edge::Fallthrough)).into_iter().collect(),
            Some(Jump::Return) => vec![],
            Some(Jump::Unconditional(idx)) => {
                target(idx).map(|node| (node, Edge::Taken)).into_iter().collect()
            }
            Some(Jump::Branch(idx)) => target(idx)
                .map(|node| (node, Edge::Taken))
                .into_iter()
                .chain(next.map(|next| (next, Edge::NotTaken)))
                .collect(),
            Some(Jump::Switch(targets)) => targets
                .iter()
                .filter_map(target)
                .map(|node| (node, Edge::Case))
                .collect(),
        };

        for (node, edge) in edges {
            graph.update_edge(block, node, edge);
        }
    }

    graph
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum InstructionCategory {
    Load,
    Constant,
    Store,
    Stack,
    Arithmetic,
    Logic,
    Conversion,
    ControlFlow,
    Invocation,
    Object,
    Other,
}

impl InstructionCategory {
    /// The style key used to paint mnemonics of this category.
    pub fn style_key(self) -> &'static str {
        match self {
            InstructionCategory::Load => "opcode.type.load",
            InstructionCategory::Constant => "opcode.type.load.const",
            InstructionCategory::Store => "opcode.type.store",
            InstructionCategory::Stack => "opcode.type.stack",
            InstructionCategory::Arithmetic => "opcode.type.arith",
            InstructionCategory::Logic => "opcode.type.logic",
            InstructionCategory::Conversion => "opcode.type.conversion",
            InstructionCategory::ControlFlow => "opcode.type.flow",
            InstructionCategory::Invocation => "opcode.type.flow.invocation",
            InstructionCategory::Object => "opcode.type.object",
            InstructionCategory::Other => "opcode.type",
        }
    }
}

pub fn get_category(opcode: u8) -> InstructionCategory {
    match opcode {
        op::ACONST_NULL..=op::LDC2_W => InstructionCategory::Constant,
        op::ILOAD..=op::SALOAD => InstructionCategory::Load,
        op::ISTORE..=op::SASTORE => InstructionCategory::Store,
        op::POP..=op::SWAP => InstructionCategory::Stack,
        op::IADD..=op::LUSHR | op::IINC => InstructionCategory::Arithmetic,
        op::IAND..=op::LXOR | op::LCMP..=op::DCMPG => InstructionCategory::Logic,
        op::I2L..=op::I2S | op::CHECKCAST | op::INSTANCEOF => InstructionCategory::Conversion,
        op::IFEQ..=op::LOOKUPSWITCH | op::IFNULL..=op::JSR_W | op::ATHROW => {
            InstructionCategory::ControlFlow
        }
        op::IRETURN..=op::RETURN | op::INVOKEVIRTUAL..=op::INVOKEDYNAMIC => {
            InstructionCategory::Invocation
        }
        op::GETSTATIC..=op::PUTFIELD
        | op::NEW..=op::ARRAYLENGTH
        | op::MONITORENTER
        | op::MONITOREXIT
        | op::MULTIANEWARRAY => InstructionCategory::Object,
        _ => InstructionCategory::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classfile::Instructions;

    fn decode(code: &[u8]) -> Vec<Instruction<'_>> {
        Instructions::new(code)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn ranges(graph: &DiGraph<BasicBlock, Edge>) -> Vec<(usize, usize)> {
        graph
            .node_weights()
            .map(|block| (block.range.start, block.range.end))
            .collect()
    }

    #[test]
    fn straight_line_code_is_one_block() {
        let code = [op::ICONST_1, op::ISTORE_0, op::RETURN];
        let graph = create_control_flow_graph(&decode(&code));
        assert_eq!(ranges(&graph), vec![(0, 2)]);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn conditional_branch_splits_blocks() {
        // 0: iload_0
        // 1: ifeq +5 -> 6
        // 4: iconst_1
        // 5: ireturn
        // 6: iconst_0
        // 7: ireturn
        let code = [
            op::ILOAD_0,
            op::IFEQ,
            0,
            5,
            op::ICONST_1,
            op::IRETURN,
            op::ICONST_0,
            op::IRETURN,
        ];
        let graph = create_control_flow_graph(&decode(&code));
        assert_eq!(ranges(&graph), vec![(0, 1), (2, 3), (4, 5)]);

        let mut edges = graph
            .raw_edges()
            .iter()
            .map(|edge| (edge.source().index(), edge.target().index(), edge.weight))
            .collect::<Vec<_>>();
        edges.sort_by_key(|&(from, to, _)| (from, to));
        assert_eq!(edges, vec![(0, 1, Edge::NotTaken), (0, 2, Edge::Taken)]);
    }

    #[test]
    fn backward_goto_loops() {
        // 0: nop
        // 1: goto -1 -> 0
        let code = [op::NOP, op::GOTO, 0xff, 0xff];
        let graph = create_control_flow_graph(&decode(&code));
        assert_eq!(ranges(&graph), vec![(0, 1)]);
        let edge = &graph.raw_edges()[0];
        assert_eq!(edge.source(), edge.target());
        assert_eq!(edge.weight, Edge::Taken);
    }

    #[test]
    fn switch_targets_become_headers() {
        // 0: iload_0
        // 1: lookupswitch, padded to 4, default +19 -> 20, one case 7 -> +20 -> 21
        // 20: return
        // 21: return
        let mut code = vec![op::ILOAD_0, op::LOOKUPSWITCH, 0, 0];
        code.extend_from_slice(&19i32.to_be_bytes());
        code.extend_from_slice(&1i32.to_be_bytes());
        code.extend_from_slice(&7i32.to_be_bytes());
        code.extend_from_slice(&20i32.to_be_bytes());
        code.push(op::RETURN);
        code.push(op::RETURN);

        let instructions = decode(&code);
        assert_eq!(instructions[2].pc(), 20);
        let graph = create_control_flow_graph(&instructions);
        assert_eq!(ranges(&graph), vec![(0, 1), (2, 2), (3, 3)]);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.raw_edges().iter().all(|edge| edge.weight == Edge::Case));
    }

    #[test]
    fn categories() {
        assert_eq!(get_category(op::LDC), InstructionCategory::Constant);
        assert_eq!(get_category(op::ALOAD_3), InstructionCategory::Load);
        assert_eq!(get_category(op::GOTO_W), InstructionCategory::ControlFlow);
        assert_eq!(get_category(op::INVOKEDYNAMIC), InstructionCategory::Invocation);
        assert_eq!(get_category(op::WIDE), InstructionCategory::Other);
    }
}
