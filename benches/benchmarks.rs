use criterion::{criterion_group, criterion_main, Criterion};
use poly8_core::{Architecture, Machine};

fn criterion_benchmark(c: &mut Criterion) {
    let mut machine = Machine::new(Architecture::XoChip).unwrap();
    // Draw 15-high sprite
    machine.load_rom(&[0xD0, 0x1F]).unwrap();
    c.bench_function("draw h15 low-res 1 plane", move |b| {
        b.iter(|| {
            machine.step().ok();
            machine.reset();
        })
    });

    let mut machine = Machine::new(Architecture::XoChip).unwrap();
    // Enable hi-res, draw 15-high sprite
    machine.load_rom(&[0x00, 0xFF, 0xD0, 0x1F]).unwrap();
    c.bench_function("draw h15 high-res 1 plane", move |b| {
        b.iter(|| {
            machine.step().ok();
            machine.step().ok();
            machine.reset();
        })
    });

    let mut machine = Machine::new(Architecture::XoChip).unwrap();
    // Enable hi-res, select both planes, draw 15-high sprite
    machine
        .load_rom(&[0x00, 0xFF, 0xF3, 0x01, 0xD0, 0x1F])
        .unwrap();
    c.bench_function("draw h15 high-res 2 planes", move |b| {
        b.iter(|| {
            machine.step().ok();
            machine.step().ok();
            machine.step().ok();
            machine.reset();
        })
    });

    let mut machine = Machine::new(Architecture::XoChip).unwrap();
    // Enable hi-res, select both planes, draw a 16x16 big sprite
    machine
        .load_rom(&[0x00, 0xFF, 0xF3, 0x01, 0xD0, 0x10])
        .unwrap();
    c.bench_function("draw large sprite 2 planes", move |b| {
        b.iter(|| {
            machine.step().ok();
            machine.step().ok();
            machine.step().ok();
            machine.reset();
        })
    });

    let mut machine = Machine::new(Architecture::XoChip).unwrap();
    // Enable hi-res, scroll right
    machine.load_rom(&[0x00, 0xFF, 0x00, 0xFB]).unwrap();
    c.bench_function("scroll 1 plane", move |b| {
        b.iter(|| {
            machine.step().ok();
            machine.step().ok();
            machine.reset();
        })
    });

    let mut machine = Machine::new(Architecture::SuperChip1_1).unwrap();
    // Enable hi-res, scroll right
    machine.load_rom(&[0x00, 0xFF, 0x00, 0xFB]).unwrap();
    c.bench_function("scroll all planes", move |b| {
        b.iter(|| {
            machine.step().ok();
            machine.step().ok();
            machine.reset();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
