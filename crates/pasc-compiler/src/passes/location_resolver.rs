//! Location Resolver Pass - give every symbol and program an address.
//!
//! Programs are numbered depth-first in pre-order; the number is the
//! program's slot in the display table, which holds the frame base of the
//! innermost active call of each program. A routine reaches a variable of
//! any enclosing routine through that routine's fixed slot, so no static
//! chain is passed at run time.
//!
//! ## Frame layout (stack grows down, `w` = word size)
//!
//! ```text
//!          ┌──────────────────────┐
//!  FP+2w+… │ arguments            │  first argument at FP+2w
//!  FP+w    │ return address       │
//!  FP      │ saved FP             │
//!  FP-w    │ saved display[i]     │  ← display[i] points here
//!          │ local 0              │  display[i] - size(local 0)
//!          │ local 1              │  display[i] - size(local 0..=1)
//!          │ …                    │
//!          └──────────────────────┘
//! ```

use pasc_core::{DISPLAY_SYMBOL, Location, Span, TargetLayout, Type};
use tracing::{debug, trace};

use crate::program::{ProgramId, ProgramTree};
use crate::scope::{DataSymbol, ScopeId, Symbol};

/// Output of the location resolver pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOutput {
    /// Number of display slots, one per program.
    pub display_count: u32,
}

/// Pass 3: storage assignment.
pub struct LocationResolver<'a, 'ast> {
    tree: &'a mut ProgramTree<'ast>,
    layout: TargetLayout,
    next_index: u32,
}

impl<'a, 'ast> LocationResolver<'a, 'ast> {
    pub fn new(tree: &'a mut ProgramTree<'ast>, layout: TargetLayout) -> Self {
        Self {
            tree,
            layout,
            next_index: 0,
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self) -> LocationOutput {
        debug!(programs = self.tree.len(), "location resolver started");
        for id in self.tree.preorder() {
            self.resolve_program(id);
        }

        let display_count = self.next_index;
        let root_scope = self.tree.program(self.tree.root()).scope();
        assert!(
            self.tree.scope(root_scope).get(DISPLAY_SYMBOL).is_none(),
            "structural bug: '{}' bound before the location resolver",
            DISPLAY_SYMBOL
        );
        self.tree.scope_mut(root_scope).insert(
            DISPLAY_SYMBOL,
            Symbol::Data(DataSymbol {
                ty: Type::array(Type::Int, 0, u64::from(display_count)),
                location: Some(Location::symbol(DISPLAY_SYMBOL)),
                init: None,
                span: Span::default(),
            }),
        );

        debug!(display_count, "location resolver finished");
        LocationOutput { display_count }
    }

    fn resolve_program(&mut self, id: ProgramId) {
        let display_index = self.next_index;
        self.next_index += 1;

        let word = self.layout.word() as i64;
        let program = self.tree.program(id);
        let scope = program.scope();
        let params = program.params().to_vec();
        let locals = program.locals().to_vec();
        let children = program.children().to_vec();
        trace!(program = program.path(), display_index, "resolving locations");

        let mut offset = 2 * word;
        for name in &params {
            let location = Location::offset(Location::frame_pointer(), Location::int(offset));
            offset += self.assign(scope, name, location);
        }
        let args_size = (offset - 2 * word) as u64;

        let frame_base = Location::indirect(Location::display_entry(display_index, &self.layout));
        let mut depth = 0;
        for name in &locals {
            let size = self.symbol_size(scope, name);
            depth += size;
            self.assign(
                scope,
                name,
                Location::offset(frame_base.clone(), Location::int(-depth)),
            );
        }

        for child in children {
            let child_program = self.tree.program(child);
            let name = child_program.name();
            // A later declaration of the same name hides the routine.
            let owns_name = matches!(
                self.tree.scope(scope).get(name),
                Some(Symbol::Prog(prog)) if prog.program == child
            );
            if owns_name {
                let label = Location::symbol(child_program.path());
                self.assign(scope, name, label);
            }
        }

        let program = self.tree.program_mut(id);
        program.display_index = Some(display_index);
        program.frame_size = depth as u64;
        program.args_size = args_size;
    }

    fn symbol_size(&self, scope: ScopeId, name: &str) -> i64 {
        match self.tree.scope(scope).get(name) {
            Some(symbol) => self.layout.size_of(symbol.ty()) as i64,
            None => panic!("structural bug: '{name}' missing from its program scope"),
        }
    }

    /// Set the location of a symbol of `scope`, returning its storage size.
    fn assign(&mut self, scope: ScopeId, name: &str, location: Location) -> i64 {
        let layout = self.layout;
        match self.tree.scope_mut(scope).get_mut(name) {
            Some(symbol) => {
                symbol.set_location(location);
                layout.size_of(symbol.ty()) as i64
            }
            None => panic!("structural bug: '{name}' missing from its program scope"),
        }
    }
}
