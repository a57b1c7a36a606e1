extern crate mandelbrot;
extern crate rand;

use mandelbrot::band::partition;
use mandelbrot::{
    render_scoped, Palette, ParallelRenderer, RenderRequest, Renderer, SequentialRenderer,
    ViewState, YStep,
};
use rand::Rng;
use std::sync::Arc;

const WORKER_COUNTS: [usize; 4] = [1, 2, 3, 7];

fn random_request<R: Rng>(rng: &mut R) -> RenderRequest {
    let view = ViewState::new(
        rng.gen_range(-2.0, 1.0),
        rng.gen_range(-1.5, 1.5),
        rng.gen_range(0.1, 500.0),
    );
    let request = RenderRequest::new(
        view,
        rng.gen_range(1, 48),
        rng.gen_range(1, 48),
        rng.gen_range(1, 400),
    );
    if rng.gen() {
        request.with_y_step(YStep::ImageHeight)
    } else {
        request
    }
}

#[test]
fn parallel_matches_sequential_for_every_worker_count() {
    let palette = Arc::new(Palette::build());
    let sequential = SequentialRenderer::new(palette.clone());
    let pools: Vec<ParallelRenderer> = WORKER_COUNTS
        .iter()
        .map(|&n| ParallelRenderer::with_workers(palette.clone(), n).unwrap())
        .collect();

    let mut rng = rand::thread_rng();
    for _ in 0..40 {
        let request = random_request(&mut rng);
        let expected = sequential.render(&request).unwrap();
        for pool in &pools {
            let frame = pool.render(&request).unwrap();
            assert_eq!(
                frame.pixels,
                expected.pixels,
                "{} workers disagree on {:?}",
                pool.workers(),
                request
            );
        }
    }
}

#[test]
fn scoped_matches_sequential_for_every_worker_count() {
    let palette = Palette::build();
    let sequential = SequentialRenderer::new(Arc::new(palette.clone()));
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        let request = random_request(&mut rng);
        let expected = sequential.render(&request).unwrap();
        for &threads in WORKER_COUNTS.iter() {
            let frame = render_scoped(&request, &palette, threads).unwrap();
            assert_eq!(frame.pixels, expected.pixels);
        }
    }
}

#[test]
fn pools_are_reused_across_renders() {
    let palette = Arc::new(Palette::build());
    let pool = ParallelRenderer::with_workers(palette.clone(), 3).unwrap();
    let request = RenderRequest::new(ViewState::new(-0.75, 0.1, 20.0), 40, 30, 300);
    let first = pool.render(&request).unwrap();
    let second = pool.render(&request).unwrap();
    assert_eq!(first.pixels, second.pixels);
    assert_eq!(pool.workers(), 3);
}

#[test]
fn random_partitions_cover_every_row_once() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let height = rng.gen_range(1, 2000);
        let workers = rng.gen_range(1, 64);
        let bands = partition(height, workers);
        assert_eq!(bands.len(), workers);
        let mut next = 0;
        for band in &bands {
            assert_eq!(band.row_start, next.min(height));
            assert!(band.row_end >= band.row_start);
            next = band.row_end;
        }
        assert_eq!(next, height);
        let covered: usize = bands.iter().map(|b| b.len()).sum();
        assert_eq!(covered, height);
    }
}
