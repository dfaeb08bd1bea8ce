use crate::element::{Element, Tag};
use crate::host::{HostId, HostSink, MemoryHost};
use crate::patch::{mount_child, PatchPlan};
use crate::runtime::Runtime;
use crate::value::Attributes;
use crate::vnode::VNode;

/// A host element tree mounted under a synthetic root, without an `App`.
pub(crate) struct Fixture {
    pub runtime: Runtime,
    pub host: MemoryHost,
    pub container: HostId,
    pub root: VNode,
}

impl Fixture {
    pub fn mount(element: Element) -> Self {
        let runtime = Runtime::default();
        let mut host = MemoryHost::new();
        let container = host.create_root("body");
        let root = VNode::new(Tag::Host("#root".to_owned()), None, Attributes::new());
        root.set_host(container);
        let node = mount_child(&root, 0, &element, &mut host, runtime.handle()).expect("mount");
        host.append_child(container, node.host_node().expect("host node"))
            .expect("attach");
        Self {
            runtime,
            host,
            container,
            root,
        }
    }

    pub fn tree(&self) -> VNode {
        self.root.child(0).expect("mounted tree")
    }

    pub fn markup(&self) -> String {
        self.host.markup(self.container)
    }

    pub fn apply(&mut self, plan: PatchPlan) {
        plan.apply(&mut self.host, self.runtime.handle())
            .expect("apply plan");
    }
}

/// `<ul>` of keyed `<li>` items whose text is the key.
pub(crate) fn keyed_list(keys: &[i64]) -> Element {
    Element::new("ul").children(
        keys.iter()
            .map(|key| Element::new("li").key(*key).child(key.to_string())),
    )
}

/// Deterministic generator for property checks.
pub(crate) struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_add(0x9E37_79B9_7F4A_7C15))
    }

    pub fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    pub fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }

    /// Random subset of `0..universe` in random order.
    pub fn unique_keys(&mut self, universe: i64) -> Vec<i64> {
        let mut keys: Vec<i64> = (0..universe).filter(|_| self.below(3) != 0).collect();
        for index in (1..keys.len()).rev() {
            let swap = self.below(index as u64 + 1) as usize;
            keys.swap(index, swap);
        }
        keys
    }
}
