// crates/substitch-compose/src/worker.rs
//
// ComposeWorker: owns the compose-job slot and the probe/save threads.
// All public API that substitch-ui calls lives here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Condvar, Mutex,
};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use uuid::Uuid;

use substitch_core::artifacts::ComposeResult;
use substitch_core::layout::StackLayout;
use substitch_core::state::SourceBytes;

use crate::decode::{decode_all, probe_pixels};
use crate::encode::{encode_png, save_png_file};
use crate::render::render_stack;
use crate::ComposeError;

/// At most this many probe decodes run at once. Imports larger than this
/// queue behind a gatekeeper thread each instead of a parked thread per
/// capture.
const PROBE_CONCURRENCY: u32 = 4;

// ── Job types ─────────────────────────────────────────────────────────────────

/// One capture inside a compose job. `bytes` is a refcounted handle shared
/// with the sequence entry, so a capture removed mid-flight stays readable
/// until this job drops it.
#[derive(Clone)]
pub struct ComposeEntry {
    pub name:  String,
    pub bytes: SourceBytes,
}

/// A snapshot of everything one compose call needs. Built by the reducer
/// at request time so a later sequence mutation cannot leak into a job
/// that was already issued.
pub struct ComposeJob {
    pub job_id:         Uuid,
    pub entries:        Vec<ComposeEntry>,
    pub spacing:        u32,
    pub subtitle_ratio: f32,
}

// ── ComposeWorker ─────────────────────────────────────────────────────────────

pub struct ComposeWorker {
    /// Shared result channel: probes, compositions, save confirmations.
    pub rx: Receiver<ComposeResult>,
    tx:     Sender<ComposeResult>,

    /// Latest-wins slot for compose jobs. A request posted while the
    /// compose thread is busy overwrites any still-pending job; the thread
    /// always wakes to the freshest one.
    job_slot: Arc<(Mutex<Option<ComposeJob>>, Condvar)>,

    /// Per-job cancel flags keyed by job_id. request_compose inserts the
    /// new job's flag and trips every older one; entries are removed when
    /// their job finishes or is overwritten in the slot.
    job_cancels: Arc<Mutex<HashMap<Uuid, Arc<AtomicBool>>>>,

    shutdown: Arc<AtomicBool>,
    /// Limits concurrent probe decodes: (active_count, Condvar).
    probe_sem: Arc<(Mutex<u32>, Condvar)>,
}

impl ComposeWorker {
    pub fn new() -> Self {
        let (tx, rx) = bounded(256);

        let job_slot: Arc<(Mutex<Option<ComposeJob>>, Condvar)> =
            Arc::new((Mutex::new(None), Condvar::new()));
        let job_cancels: Arc<Mutex<HashMap<Uuid, Arc<AtomicBool>>>> =
            Arc::new(Mutex::new(HashMap::new()));

        // ── Compose thread ────────────────────────────────────────────────────
        // Blocks on the latest-wins slot; one pipeline run per wake.
        let result_tx = tx.clone();
        let slot      = Arc::clone(&job_slot);
        let cancels   = Arc::clone(&job_cancels);
        thread::spawn(move || loop {
            let job = {
                let (lock, cvar) = &*slot;
                let mut guard = lock.lock().unwrap();
                while guard.is_none() {
                    guard = cvar.wait(guard).unwrap();
                }
                guard.take().unwrap()
            };

            // Poison-pill: a job with a nil id signals shutdown.
            if job.job_id == Uuid::nil() {
                return;
            }

            let cancel = cancels
                .lock()
                .unwrap()
                .get(&job.job_id)
                .cloned()
                .unwrap_or_default();

            let result = run_compose(&job, &cancel);
            match result {
                Ok(Some(res)) => {
                    let _ = result_tx.send(res);
                }
                Ok(None) => {
                    eprintln!("[compose] empty job {} ignored", job.job_id);
                }
                Err(ComposeError::Cancelled) => {
                    eprintln!("[compose] job {} superseded, result dropped", job.job_id);
                    let _ = result_tx.send(ComposeResult::ComposeFailed {
                        job_id:     job.job_id,
                        entry_name: String::new(),
                        msg:        ComposeError::Cancelled.to_string(),
                    });
                }
                Err(ComposeError::Decode { name, source }) => {
                    eprintln!("[compose] decode failed for {name}: {source}");
                    let _ = result_tx.send(ComposeResult::ComposeFailed {
                        job_id:     job.job_id,
                        entry_name: name,
                        msg:        source.to_string(),
                    });
                }
                Err(e @ ComposeError::Encode { .. }) => {
                    eprintln!("[compose] {e}");
                    let _ = result_tx.send(ComposeResult::ComposeFailed {
                        job_id:     job.job_id,
                        entry_name: String::new(),
                        msg:        e.to_string(),
                    });
                }
            }

            // Drop the flag once the job is done so the map never grows
            // beyond the jobs actually in flight.
            cancels.lock().unwrap().remove(&job.job_id);
        });

        Self {
            rx,
            tx,
            job_slot,
            job_cancels,
            shutdown:  Arc::new(AtomicBool::new(false)),
            probe_sem: Arc::new((Mutex::new(0), Condvar::new())),
        }
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for flag in self.job_cancels.lock().unwrap().values() {
            flag.store(true, Ordering::Relaxed);
        }
        // Wake the compose thread with a poison-pill so it exits cleanly
        // instead of blocking forever on the condvar.
        let (lock, cvar) = &*self.job_slot;
        *lock.lock().unwrap() = Some(ComposeJob {
            job_id:         Uuid::nil(),
            entries:        Vec::new(),
            spacing:        0,
            subtitle_ratio: 0.0,
        });
        cvar.notify_one();
    }

    /// Post a compose job. Any pending job in the slot is overwritten and
    /// every older in-flight job's cancel flag is tripped; their results,
    /// if they arrive at all, carry a stale job_id and are discarded by
    /// the UI's stamp guard.
    pub fn request_compose(&self, job: ComposeJob) {
        {
            let mut cancels = self.job_cancels.lock().unwrap();
            for (id, flag) in cancels.iter() {
                if *id != job.job_id {
                    flag.store(true, Ordering::Relaxed);
                }
            }
            cancels.insert(job.job_id, Arc::new(AtomicBool::new(false)));
        }

        let (lock, cvar) = &*self.job_slot;
        let overwritten = lock.lock().unwrap().replace(job);
        if let Some(prev) = overwritten {
            // Never started; remove its flag so the map stays tight.
            self.job_cancels.lock().unwrap().remove(&prev.job_id);
        }
        cvar.notify_one();
    }

    /// Decode `bytes` in the background and report natural size plus a
    /// strip thumbnail for entry `id`.
    pub fn probe_source(&self, id: Uuid, name: String, bytes: SourceBytes) {
        let tx  = self.tx.clone();
        let sd  = self.shutdown.clone();
        let sem = self.probe_sem.clone();

        // Gatekeeper thread acquires the semaphore before doing the real
        // work, so a large import parks at most one waiter at a time.
        thread::spawn(move || {
            {
                let (lock, cvar) = &*sem;
                let mut count = lock.lock().unwrap();
                while *count >= PROBE_CONCURRENCY {
                    count = cvar.wait(count).unwrap();
                }
                *count += 1;
            }
            struct SemGuard(Arc<(Mutex<u32>, Condvar)>);
            impl Drop for SemGuard {
                fn drop(&mut self) {
                    let (lock, cvar) = &*self.0;
                    *lock.lock().unwrap() -= 1;
                    cvar.notify_one();
                }
            }
            let _guard = SemGuard(sem);

            if sd.load(Ordering::Relaxed) {
                return;
            }
            match probe_pixels(bytes.as_slice()) {
                Ok(probe) => {
                    eprintln!("[probe] {name}: {}x{}", probe.width, probe.height);
                    let _ = tx.send(ComposeResult::SourcePixels {
                        id,
                        width:        probe.width,
                        height:       probe.height,
                        thumb_width:  probe.thumb_width,
                        thumb_height: probe.thumb_height,
                        thumb_rgba:   probe.thumb_rgba,
                    });
                }
                Err(e) => {
                    eprintln!("[probe] {name}: {e}");
                    let _ = tx.send(ComposeResult::ProbeFailed { id, msg: e.to_string() });
                }
            }
        });
    }

    /// Decode one capture at full resolution for the lightbox overlay.
    /// One-shot thread, no semaphore: at most one lightbox is open and the
    /// user is waiting on it.
    pub fn decode_full(&self, id: Uuid, name: String, bytes: SourceBytes) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) {
                return;
            }
            match crate::decode::decode_rgba(bytes.as_slice()) {
                Ok(img) => {
                    let (width, height) = img.dimensions();
                    let _ = tx.send(ComposeResult::FullPixels {
                        id,
                        width,
                        height,
                        rgba: img.into_raw(),
                    });
                }
                Err(e) => {
                    eprintln!("[lightbox] {name}: {e}");
                    let _ = tx.send(ComposeResult::ProbeFailed { id, msg: e.to_string() });
                }
            }
        });
    }

    /// Write an already-encoded PNG to `dest` on a background thread.
    pub fn save_composed(&self, png: Arc<Vec<u8>>, dest: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) {
                return;
            }
            match save_png_file(&dest, &png) {
                Ok(())  => {
                    eprintln!("[save] composed PNG -> {}", dest.display());
                    let _ = tx.send(ComposeResult::Saved { path: dest });
                }
                Err(e) => {
                    eprintln!("[save] {e:#}");
                    let _ = tx.send(ComposeResult::SaveFailed { msg: format!("{e:#}") });
                }
            }
        });
    }
}

impl Default for ComposeWorker {
    fn default() -> Self {
        Self::new()
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run one compose job to completion: decode everything, plan the stack,
/// render, encode. Returns Ok(None) for an empty job (nothing to compose,
/// no canvas allocated). The cancel flag is checked between stages and
/// inside the decode fan-out; measuring starts only after every decode
/// has settled.
fn run_compose(
    job:    &ComposeJob,
    cancel: &AtomicBool,
) -> Result<Option<ComposeResult>, ComposeError> {
    let images = decode_all(&job.entries, cancel)?;

    let sizes: Vec<(u32, u32)> = images.iter().map(|img| img.dimensions()).collect();
    let Some(layout) = StackLayout::plan(&sizes, job.spacing, job.subtitle_ratio) else {
        return Ok(None);
    };

    if cancel.load(Ordering::Relaxed) {
        return Err(ComposeError::Cancelled);
    }
    let canvas = render_stack(&layout, &images);

    if cancel.load(Ordering::Relaxed) {
        return Err(ComposeError::Cancelled);
    }
    let (width, height) = canvas.dimensions();
    let rgba = canvas.into_raw();
    let png  = encode_png(width, height, &rgba)
        .map_err(|e| ComposeError::Encode { msg: format!("{e:#}") })?;

    eprintln!(
        "[compose] {} captures -> {width}x{height} ({} KB png)",
        job.entries.len(),
        png.len() / 1024,
    );

    Ok(Some(ComposeResult::Composed {
        job_id: job.job_id,
        width,
        height,
        rgba,
        png,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::time::Duration;

    fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba(rgba));
        encode_png(w, h, img.as_raw()).unwrap()
    }

    fn entry(name: &str, png: Vec<u8>) -> ComposeEntry {
        ComposeEntry { name: name.into(), bytes: SourceBytes::new(png) }
    }

    fn recv(worker: &ComposeWorker) -> ComposeResult {
        worker
            .rx
            .recv_timeout(Duration::from_secs(10))
            .expect("worker result within 10s")
    }

    #[test]
    fn compose_end_to_end_produces_stacked_png() {
        let worker = ComposeWorker::new();
        let job_id = Uuid::new_v4();
        worker.request_compose(ComposeJob {
            job_id,
            entries: vec![
                entry("a.png", solid_png(8, 10, [200, 0, 0, 255])),
                entry("b.png", solid_png(6, 5, [0, 0, 200, 255])),
            ],
            spacing:        1,
            subtitle_ratio: 0.2,
        });

        match recv(&worker) {
            ComposeResult::Composed { job_id: id, width, height, rgba, png } => {
                assert_eq!(id, job_id);
                assert_eq!((width, height), (8, 12));
                assert_eq!(rgba.len(), 8 * 12 * 4);
                assert!(!png.is_empty());
                // Row 11 is the one-row band from b.png: blue, then a white
                // gutter where b is narrower than the canvas.
                let px = |x: usize, y: usize| {
                    let i = (y * 8 + x) * 4;
                    [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
                };
                assert_eq!(px(0, 11), [0, 0, 200, 255]);
                assert_eq!(px(7, 11), [255, 255, 255, 255]);
            }
            other => panic!("expected Composed, got {other:?}"),
        }
        worker.shutdown();
    }

    #[test]
    fn decode_failure_fails_fast_and_names_the_capture() {
        let worker = ComposeWorker::new();
        let job_id = Uuid::new_v4();
        worker.request_compose(ComposeJob {
            job_id,
            entries: vec![
                entry("fine.png", solid_png(4, 4, [1, 2, 3, 255])),
                entry("corrupt.png", vec![1, 2, 3, 4, 5]),
            ],
            spacing:        0,
            subtitle_ratio: 0.5,
        });

        match recv(&worker) {
            ComposeResult::ComposeFailed { job_id: id, entry_name, .. } => {
                assert_eq!(id, job_id);
                assert_eq!(entry_name, "corrupt.png");
            }
            other => panic!("expected ComposeFailed, got {other:?}"),
        }
        worker.shutdown();
    }

    #[test]
    fn probe_reports_size_for_valid_and_failure_for_garbage() {
        let worker = ComposeWorker::new();
        let good = Uuid::new_v4();
        let bad  = Uuid::new_v4();
        worker.probe_source(good, "good.png".into(),
            SourceBytes::new(solid_png(40, 20, [9, 9, 9, 255])));
        worker.probe_source(bad, "bad.png".into(),
            SourceBytes::new(vec![0xff; 16]));

        let mut size_seen  = false;
        let mut fail_seen  = false;
        for _ in 0..2 {
            match recv(&worker) {
                ComposeResult::SourcePixels { id, width, height, .. } => {
                    assert_eq!(id, good);
                    assert_eq!((width, height), (40, 20));
                    size_seen = true;
                }
                ComposeResult::ProbeFailed { id, .. } => {
                    assert_eq!(id, bad);
                    fail_seen = true;
                }
                other => panic!("unexpected result {other:?}"),
            }
        }
        assert!(size_seen && fail_seen);
        worker.shutdown();
    }

    #[test]
    fn save_composed_writes_the_png() {
        let dir  = tempfile::tempdir().unwrap();
        let dest = dir.path().join("stitched_subtitles.png");
        let png  = Arc::new(solid_png(3, 3, [0, 128, 0, 255]));

        let worker = ComposeWorker::new();
        worker.save_composed(Arc::clone(&png), dest.clone());

        match recv(&worker) {
            ComposeResult::Saved { path } => assert_eq!(path, dest),
            other => panic!("expected Saved, got {other:?}"),
        }
        assert_eq!(std::fs::read(&dest).unwrap(), *png);
        worker.shutdown();
    }
}
