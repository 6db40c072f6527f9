#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use panelstack_recycler::{RecyclerAdapter, RecyclerConfig, RecyclerList};

#[derive(Debug, Arbitrary)]
struct Input {
    viewport: u16,
    item: u8,
    spacing: u8,
    header: Option<u8>,
    footer: Option<u8>,
    horizontal: bool,
    count: u16,
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    ScrollTo(u32),
    ScrollBy(i16),
    ScrollToIndex(u16),
    Fling { velocity: i16, frames: u8 },
    Drag { delta: i16, dt_ms: u8 },
    Reload(u16),
}

struct Indices {
    count: usize,
}

impl RecyclerAdapter<Option<usize>> for Indices {
    fn item_count(&self) -> usize {
        self.count
    }

    fn bind_view(&mut self, index: usize, view: &mut Option<usize>) {
        *view = Some(index);
    }
}

fuzz_target!(|input: Input| {
    if input.ops.len() > 256 {
        return;
    }
    let mut config = RecyclerConfig::default()
        .viewport_extent(f32::from(input.viewport))
        .item_extent(f32::from(input.item.max(1)))
        .spacing(f32::from(input.spacing));
    config.header_extent = input.header.map(f32::from);
    config.footer_extent = input.footer.map(f32::from);
    if input.horizontal {
        config = config.horizontal();
    }

    let adapter = Indices {
        count: usize::from(input.count),
    };
    let Ok(mut list) = RecyclerList::new(config, adapter, || None) else {
        return;
    };

    for op in &input.ops {
        match *op {
            Op::ScrollTo(offset) => list.scroll_to(offset as f32),
            Op::ScrollBy(delta) => list.scroll_by(f32::from(delta)),
            Op::ScrollToIndex(index) => list.scroll_to_index(usize::from(index)),
            Op::Fling { velocity, frames } => {
                list.fling(f32::from(velocity) * 10.0);
                for _ in 0..frames {
                    list.tick(1.0 / 60.0);
                }
            }
            Op::Drag { delta, dt_ms } => {
                list.begin_drag();
                list.drag_by(f32::from(delta), f32::from(dt_ms) / 1000.0);
                list.end_drag();
            }
            Op::Reload(count) => {
                list.adapter_mut().count = usize::from(count);
                list.reload();
            }
        }

        // Post-conditions that must always hold:
        let top = list.top_index();
        let expected: Vec<usize> = (top..top + list.capacity()).collect();
        assert_eq!(list.bound_indices(), expected, "window not contiguous");
        for (index, view) in list.views() {
            assert_eq!(*view, Some(index), "stale binding");
        }
        assert_eq!(list.pool().outstanding(), list.capacity() as u64);
        assert!(list.scroll_offset() >= 0.0);
        assert!(list.scroll_offset() <= list.max_scroll_offset());
    }
});
