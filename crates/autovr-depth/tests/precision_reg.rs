//! Precision controller regression test
//!
//! Drives the controller with a scripted depth model that runs out of
//! memory above a width threshold, during inference or while loading.

use autovr_core::{Channels, DepthMap, Image};
use autovr_depth::{
    ControllerState, DepthError, DepthModel, DepthResult, ModelLoader, ModelSpec,
    PrecisionController, PrecisionMode, PrecisionSpec, classify_failure,
};
use autovr_test::RegParams;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Calls {
    loads: Vec<(u32, u32)>,
    unloads: usize,
    infers: Vec<(u32, u32)>,
}

const OUT_OF_MEMORY: &str = "CUDA out of memory. Tried to allocate 64.00 MiB (GPU 0; 2.00 GiB \
                             total capacity; 1.90 GiB already allocated; 12.00 MiB free; \
                             1.95 GiB reserved)";

/// Width limits above which each stage runs out of memory
#[derive(Clone, Copy)]
struct Limits {
    load: u32,
    configure: u32,
    infer: u32,
}

impl Limits {
    fn infer(max_width: u32) -> Self {
        Self {
            load: u32::MAX,
            configure: u32::MAX,
            infer: max_width,
        }
    }
}

/// Fails with a runtime-style out-of-memory message above its limits, and
/// with a plain error when `broken` is set.
struct ScriptedModel {
    calls: Rc<RefCell<Calls>>,
    size: (u32, u32),
    limits: Limits,
    broken: bool,
}

impl DepthModel for ScriptedModel {
    fn configure(&mut self, width: u32, height: u32) -> DepthResult<()> {
        if width > self.limits.configure {
            return Err(classify_failure(OUT_OF_MEMORY));
        }
        self.size = (width, height);
        Ok(())
    }

    fn infer(&mut self, _image: &Image) -> DepthResult<DepthMap> {
        self.calls.borrow_mut().infers.push(self.size);
        if self.broken {
            return Err(classify_failure("weights file is corrupt"));
        }
        if self.size.0 > self.limits.infer {
            return Err(classify_failure(OUT_OF_MEMORY));
        }
        Ok(DepthMap::from_fn(self.size.0, self.size.1, |x, y| {
            1.0 + x as f32 + y as f32
        })?)
    }
}

struct ScriptedLoader {
    calls: Rc<RefCell<Calls>>,
    limits: Limits,
    broken: bool,
}

impl ModelLoader for ScriptedLoader {
    type Model = ScriptedModel;

    fn load(&mut self, _spec: &ModelSpec, width: u32, height: u32) -> DepthResult<ScriptedModel> {
        if width > self.limits.load {
            return Err(classify_failure(OUT_OF_MEMORY));
        }
        self.calls.borrow_mut().loads.push((width, height));
        Ok(ScriptedModel {
            calls: self.calls.clone(),
            size: (0, 0),
            limits: self.limits,
            broken: self.broken,
        })
    }

    fn unload(&mut self, _model: ScriptedModel) {
        self.calls.borrow_mut().unloads += 1;
    }
}

fn controller(
    max_width: u32,
    broken: bool,
    mode: PrecisionMode,
) -> (PrecisionController<ScriptedLoader>, Rc<RefCell<Calls>>) {
    limited_controller(Limits::infer(max_width), broken, mode)
}

fn limited_controller(
    limits: Limits,
    broken: bool,
    mode: PrecisionMode,
) -> (PrecisionController<ScriptedLoader>, Rc<RefCell<Calls>>) {
    let calls = Rc::new(RefCell::new(Calls::default()));
    let loader = ScriptedLoader {
        calls: calls.clone(),
        limits,
        broken,
    };
    let ctl = PrecisionController::new(loader, ModelSpec::default(), mode).expect("controller");
    (ctl, calls)
}

#[test]
fn precision_reg() {
    let mut rp = RegParams::new("precision");
    let image = Image::new(100, 100, Channels::Rgb).expect("image");
    let full = PrecisionSpec::Factor { factor: 1.0 };

    // --- Test 1: fail at 1.0, 0.9, 0.8 and succeed at 0.7 ---
    let (mut ctl, calls) = controller(75, false, PrecisionMode::Adaptive);
    let depth = ctl
        .run_adaptive_precision(&image, &full)
        .expect("adaptive inference");
    rp.compare_values(100.0, depth.width() as f64, 0.0);
    rp.compare_values(100.0, depth.height() as f64, 0.0);
    rp.check(
        calls.borrow().infers == vec![(100, 100), (90, 90), (80, 80), (70, 70)],
        "attempt sizes 100, 90, 80, 70",
    );
    let state = *ctl.precision_state(100, 100).expect("cached state");
    rp.compare_values(0.7, state.last_successful.unwrap_or(0.0), 1e-12);
    rp.compare_values(0.7, state.current_factor, 1e-12);
    rp.check(
        ctl.state()
            == ControllerState::Loaded {
                width: 70,
                height: 70,
            },
        "loaded at 70x70",
    );

    // --- Test 2: the next image of that size starts at the cached factor ---
    let loads_before = calls.borrow().loads.len();
    ctl.run_adaptive_precision(&image, &full)
        .expect("cached inference");
    rp.compare_values(5.0, calls.borrow().infers.len() as f64, 0.0);
    rp.check(
        calls.borrow().infers.last() == Some(&(70, 70)),
        "single attempt at 0.7",
    );
    rp.compare_values(
        loads_before as f64,
        calls.borrow().loads.len() as f64,
        0.0,
    );

    // --- Test 3: a fixed pixel size is its own cache entry ---
    let pixels = PrecisionSpec::Pixels {
        width: 60,
        height: 40,
    };
    ctl.run_adaptive_precision(&image, &pixels)
        .expect("pixel precision");
    rp.check(
        calls.borrow().infers.last() == Some(&(60, 40)),
        "pixel precision runs at 60x40",
    );
    rp.check(ctl.precision_state(60, 40).is_some(), "pixel key cached");
    drop(ctl);
    rp.check(
        calls.borrow().unloads == calls.borrow().loads.len(),
        "every load unloaded",
    );

    // --- Test 4: manual mode makes a single attempt ---
    let (mut manual, calls) = controller(75, false, PrecisionMode::Manual);
    let result = manual.run_adaptive_precision(&image, &full);
    rp.check(
        matches!(result, Err(DepthError::ResourceExhausted(r)) if r.attempted == Some(64 << 20)),
        "manual mode surfaces the allocation report",
    );
    rp.compare_values(1.0, calls.borrow().infers.len() as f64, 0.0);
    let half = PrecisionSpec::Factor { factor: 0.5 };
    let depth = manual
        .run_adaptive_precision(&image, &half)
        .expect("manual at half");
    rp.compare_values(100.0, depth.width() as f64, 0.0);
    rp.check(
        manual.precision_state(100, 100).is_none(),
        "manual mode leaves the cache alone",
    );

    // --- Test 5: non-memory failures propagate without retry ---
    let (mut broken, calls) = controller(1000, true, PrecisionMode::Adaptive);
    let result = broken.run_adaptive_precision(&image, &full);
    rp.check(
        matches!(result, Err(DepthError::Model(_))),
        "model error propagates",
    );
    rp.compare_values(1.0, calls.borrow().infers.len() as f64, 0.0);

    // --- Test 6: the budget runs out at factor zero ---
    let (mut starved, calls) = controller(0, false, PrecisionMode::Adaptive);
    let result = starved.run_adaptive_precision(&image, &full);
    rp.check(
        matches!(
            result,
            Err(DepthError::ExhaustedRetryBudget {
                width: 100,
                height: 100,
                attempts: 10
            })
        ),
        "exhausted after ten attempts",
    );
    rp.check(
        calls.borrow().infers.last() == Some(&(10, 10)),
        "last attempt at factor 0.1",
    );
    rp.check(
        starved.state() == ControllerState::Unloaded,
        "released after giving up",
    );

    // --- Test 7: each requested size keeps its own remembered factor ---
    let (mut ctl, calls) = controller(1000, false, PrecisionMode::Adaptive);
    let half = PrecisionSpec::Factor { factor: 0.5 };
    ctl.run_adaptive_precision(&image, &full)
        .expect("full precision");
    let depth = ctl
        .run_adaptive_precision(&image, &half)
        .expect("half precision");
    rp.compare_values(100.0, depth.width() as f64, 0.0);
    rp.check(
        calls.borrow().infers == vec![(100, 100), (50, 50)],
        "half precision runs at 50x50 after a full-size success",
    );
    let state = *ctl.precision_state(50, 50).expect("half-size state");
    rp.compare_values(0.5, state.last_successful.unwrap_or(0.0), 1e-12);
    ctl.run_adaptive_precision(&image, &full)
        .expect("full precision again");
    rp.check(
        calls.borrow().infers.last() == Some(&(100, 100)),
        "full precision unaffected by the half-size entry",
    );

    // --- Test 8: a remembered factor never raises the requested one ---
    let (mut ctl, calls) = controller(1000, false, PrecisionMode::Adaptive);
    let fixed = PrecisionSpec::Pixels {
        width: 50,
        height: 50,
    };
    ctl.run_adaptive_precision(&image, &fixed)
        .expect("fixed 50x50");
    ctl.run_adaptive_precision(&image, &half)
        .expect("half of 100x100");
    rp.check(
        calls.borrow().infers == vec![(50, 50), (50, 50)],
        "same working size from a larger base stays at 50x50",
    );

    // --- Test 9: running out of memory while loading is retried ---
    let limits = Limits {
        load: 90,
        configure: u32::MAX,
        infer: u32::MAX,
    };
    let (mut ctl, calls) = limited_controller(limits, false, PrecisionMode::Adaptive);
    ctl.run_adaptive_precision(&image, &full)
        .expect("load retry");
    rp.check(
        calls.borrow().loads == vec![(90, 90)],
        "first successful load at 90x90",
    );
    rp.check(
        calls.borrow().infers == vec![(90, 90)],
        "inference only on the loaded model",
    );
    rp.compare_values(
        0.9,
        ctl.precision_state(100, 100)
            .and_then(|s| s.last_successful)
            .unwrap_or(0.0),
        1e-12,
    );

    // --- Test 10: running out of memory while configuring is retried ---
    let limits = Limits {
        load: u32::MAX,
        configure: 80,
        infer: u32::MAX,
    };
    let (mut ctl, calls) = limited_controller(limits, false, PrecisionMode::Adaptive);
    ctl.run_adaptive_precision(&image, &full)
        .expect("configure retry");
    rp.check(
        calls.borrow().loads == vec![(100, 100), (90, 90), (80, 80)],
        "loaded at 100, 90, then 80",
    );
    rp.compare_values(2.0, calls.borrow().unloads as f64, 0.0);
    rp.check(
        calls.borrow().infers == vec![(80, 80)],
        "inference only after configuring",
    );
    drop(ctl);
    rp.compare_values(3.0, calls.borrow().unloads as f64, 0.0);

    assert!(rp.cleanup(), "precision regression test failed");
}
