use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use renderer::runtime::SteppedTimeSource;
use renderer::{
    FrameRequest, Host, InboxSender, InteractionEvent, InteractionRates, ListenerId,
    ProgramVariant, RenderBackend, RenderSession, SessionError, SessionEvent, SessionOptions,
    SessionState, UniformBlock, Viewport,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    RequestFrame(u64),
    CancelFrame(u64),
    AddListener(u64),
    RemoveListener(u64),
    Attach,
    Detach,
    Compile(ProgramVariant),
    CreateBuffers,
    Resize(Viewport),
    Draw(UniformBlock),
    ReleaseBuffers,
    ReleaseProgram,
    ReleaseContext,
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
    listeners: Vec<(ListenerId, InboxSender)>,
    next_id: u64,
    fail_compile: bool,
    fail_buffers: bool,
    fail_draw_after: Option<usize>,
    draws: usize,
}

type Shared = Rc<RefCell<Recorder>>;

struct MockHost {
    size: Viewport,
    log: Shared,
}

impl Host for MockHost {
    fn surface_size(&self) -> Viewport {
        self.size
    }

    fn request_frame(&mut self) -> FrameRequest {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        let id = log.next_id;
        log.calls.push(Call::RequestFrame(id));
        FrameRequest(id)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.log.borrow_mut().calls.push(Call::CancelFrame(request.0));
    }

    fn add_listener(&mut self, sender: InboxSender) -> ListenerId {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        let id = ListenerId(log.next_id);
        log.calls.push(Call::AddListener(id.0));
        log.listeners.push((id, sender));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::RemoveListener(id.0));
        log.listeners.retain(|(entry, _)| *entry != id);
    }

    fn attach_target(&mut self) {
        self.log.borrow_mut().calls.push(Call::Attach);
    }

    fn detach_target(&mut self) {
        self.log.borrow_mut().calls.push(Call::Detach);
    }
}

/// Framebuffers larger than this are clamped, like a device texture limit.
const MAX_DIMENSION: u32 = 4096;

struct MockBackend {
    size: Viewport,
    log: Shared,
}

impl RenderBackend for MockBackend {
    fn resize(&mut self, viewport: Viewport) {
        self.log.borrow_mut().calls.push(Call::Resize(viewport));
        self.size = Viewport::new(
            viewport.width.min(MAX_DIMENSION),
            viewport.height.min(MAX_DIMENSION),
        );
    }

    fn framebuffer_size(&self) -> Viewport {
        self.size
    }

    fn compile_program(&mut self, variant: ProgramVariant) -> Result<(), SessionError> {
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::Compile(variant));
        if log.fail_compile {
            return Err(SessionError::ProgramCompile {
                variant,
                message: "syntax error".to_string(),
            });
        }
        Ok(())
    }

    fn create_buffers(&mut self) -> Result<(), SessionError> {
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::CreateBuffers);
        if log.fail_buffers {
            return Err(SessionError::ResourceMissing("buffers"));
        }
        Ok(())
    }

    fn draw(&mut self, uniforms: &UniformBlock) -> Result<(), SessionError> {
        let mut log = self.log.borrow_mut();
        if log.fail_draw_after.is_some_and(|limit| log.draws >= limit) {
            return Err(SessionError::ResourceMissing("buffers"));
        }
        log.draws += 1;
        log.calls.push(Call::Draw(*uniforms));
        Ok(())
    }

    fn release_buffers(&mut self) {
        self.log.borrow_mut().calls.push(Call::ReleaseBuffers);
    }

    fn release_program(&mut self) {
        self.log.borrow_mut().calls.push(Call::ReleaseProgram);
    }

    fn release_context(&mut self) {
        self.log.borrow_mut().calls.push(Call::ReleaseContext);
    }
}

type Session = RenderSession<MockHost, MockBackend>;

fn new_session(options: SessionOptions, size: Viewport, log: &Shared) -> Session {
    let host = MockHost {
        size,
        log: log.clone(),
    };
    RenderSession::new(host, options)
}

fn start(session: &mut Session, log: &Shared) -> Result<(), SessionError> {
    let log = log.clone();
    session.start(move |host, viewport| {
        assert_eq!(viewport, host.surface_size());
        Ok(MockBackend {
            size: viewport,
            log,
        })
    })
}

fn running(options: SessionOptions, size: Viewport) -> (Session, Shared) {
    let log = Shared::default();
    let mut session = new_session(options, size, &log);
    start(&mut session, &log).expect("session starts");
    (session, log)
}

/// Delivers `event` the way a host does: through every registered listener.
fn emit(log: &Shared, event: SessionEvent) {
    for (_, sender) in &log.borrow().listeners {
        sender.send(event);
    }
}

fn draws(log: &Shared) -> Vec<UniformBlock> {
    log.borrow()
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::Draw(block) => Some(*block),
            _ => None,
        })
        .collect()
}

fn calls(log: &Shared) -> Vec<Call> {
    log.borrow().calls.clone()
}

#[test]
fn dispose_without_start_touches_nothing() {
    let log = Shared::default();
    let mut session = new_session(SessionOptions::default(), Viewport::new(640, 480), &log);
    session.dispose();

    assert_eq!(session.state(), SessionState::Disposed);
    assert!(calls(&log).is_empty());
}

#[test]
fn start_then_dispose_releases_in_order() {
    let (mut session, log) = running(SessionOptions::default(), Viewport::new(640, 480));
    assert_eq!(session.state(), SessionState::Running);
    assert_eq!(log.borrow().listeners.len(), 1);

    session.dispose();

    assert_eq!(
        calls(&log),
        vec![
            Call::Compile(ProgramVariant::Vortex),
            Call::CreateBuffers,
            Call::Attach,
            Call::AddListener(1),
            Call::RequestFrame(2),
            Call::CancelFrame(2),
            Call::RemoveListener(1),
            Call::ReleaseBuffers,
            Call::ReleaseProgram,
            Call::ReleaseContext,
            Call::Detach,
        ]
    );
    assert!(log.borrow().listeners.is_empty());
}

#[test]
fn disposing_twice_is_a_noop() {
    let (mut session, log) = running(SessionOptions::default(), Viewport::new(320, 200));
    session.tick().unwrap();
    session.dispose();
    let after_first = calls(&log);

    session.dispose();
    drop(session);

    assert_eq!(calls(&log), after_first);
    let releases = after_first
        .iter()
        .filter(|call| **call == Call::ReleaseContext)
        .count();
    assert_eq!(releases, 1);
}

#[test]
fn dropping_a_running_session_disposes_it() {
    let (session, log) = running(SessionOptions::default(), Viewport::new(320, 200));
    drop(session);

    let calls = calls(&log);
    assert_eq!(calls.last(), Some(&Call::Detach));
    assert!(calls.contains(&Call::ReleaseContext));
    assert!(log.borrow().listeners.is_empty());
}

#[test]
fn resize_is_visible_on_the_next_frame() {
    let (mut session, log) = running(
        SessionOptions::new(ProgramVariant::StarryNight),
        Viewport::new(800, 600),
    );
    session.tick().unwrap();

    emit(&log, SessionEvent::Resize(Viewport::new(1920, 1080)));
    assert_eq!(session.uniforms().resolution(), [800.0, 600.0]);

    let report = session.tick().unwrap();
    assert_eq!(report.resolution, [1920.0, 1080.0]);
    assert_eq!(draws(&log).last().unwrap().resolution, [1920.0, 1080.0]);
    assert_eq!(session.camera().aspect(), Some(1920.0 / 1080.0));
    assert!(calls(&log).contains(&Call::Resize(Viewport::new(1920, 1080))));
}

#[test]
fn identical_and_empty_resizes_do_not_reach_the_backend() {
    let (mut session, log) = running(SessionOptions::default(), Viewport::new(800, 600));
    emit(&log, SessionEvent::Resize(Viewport::new(800, 600)));
    emit(&log, SessionEvent::Resize(Viewport::new(0, 0)));
    session.tick().unwrap();

    assert!(!calls(&log)
        .iter()
        .any(|call| matches!(call, Call::Resize(_))));
    assert_eq!(draws(&log)[0].resolution, [800.0, 600.0]);
}

#[test]
fn resolution_follows_the_framebuffer_not_the_request() {
    let (mut session, log) = running(SessionOptions::default(), Viewport::new(800, 600));
    emit(&log, SessionEvent::Resize(Viewport::new(8000, 600)));

    let report = session.tick().unwrap();
    assert_eq!(report.resolution, [MAX_DIMENSION as f32, 600.0]);
    assert_eq!(
        session.camera().aspect(),
        Some(MAX_DIMENSION as f32 / 600.0)
    );
}

#[test]
fn unavailable_context_leaves_the_host_untouched() {
    let log = Shared::default();
    let mut session = new_session(SessionOptions::default(), Viewport::new(640, 480), &log);

    let err = session
        .start(|_, _| Err(SessionError::ContextUnavailable("no adapter".to_string())))
        .unwrap_err();

    assert!(matches!(err, SessionError::ContextUnavailable(_)));
    assert!(calls(&log).is_empty());
    assert_eq!(session.state(), SessionState::Disposed);
    assert!(matches!(
        session.tick(),
        Err(SessionError::Lifecycle(SessionState::Disposed))
    ));
    assert!(session.backend().is_none());
}

#[test]
fn compile_failure_releases_the_context_without_attaching() {
    let log = Shared::default();
    log.borrow_mut().fail_compile = true;
    let mut session = new_session(
        SessionOptions::new(ProgramVariant::BlackHole),
        Viewport::new(640, 480),
        &log,
    );

    let err = start(&mut session, &log).unwrap_err();

    assert!(matches!(
        err,
        SessionError::ProgramCompile {
            variant: ProgramVariant::BlackHole,
            ..
        }
    ));
    assert_eq!(
        calls(&log),
        vec![
            Call::Compile(ProgramVariant::BlackHole),
            Call::ReleaseBuffers,
            Call::ReleaseProgram,
            Call::ReleaseContext,
        ]
    );
    assert_eq!(session.state(), SessionState::Disposed);
}

#[test]
fn late_start_failure_leaves_the_same_state_as_a_compile_failure() {
    let log = Shared::default();
    log.borrow_mut().fail_buffers = true;
    let mut session = new_session(SessionOptions::default(), Viewport::new(640, 480), &log);

    let err = start(&mut session, &log).unwrap_err();

    assert!(matches!(err, SessionError::ResourceMissing("buffers")));
    assert_eq!(
        calls(&log),
        vec![
            Call::Compile(ProgramVariant::Vortex),
            Call::CreateBuffers,
            Call::ReleaseBuffers,
            Call::ReleaseProgram,
            Call::ReleaseContext,
        ]
    );
    assert_eq!(session.state(), SessionState::Disposed);
    assert!(session.backend().is_none());
    assert!(session.pending_frame().is_none());
    assert!(matches!(
        start(&mut session, &log),
        Err(SessionError::Lifecycle(SessionState::Disposed))
    ));
}

#[test]
fn frame_failure_stops_the_loop_and_disposes() {
    let (mut session, log) = running(SessionOptions::default(), Viewport::new(320, 240));
    log.borrow_mut().fail_draw_after = Some(2);

    session.tick().unwrap();
    session.tick().unwrap();
    let err = session.tick().unwrap_err();

    assert!(matches!(err, SessionError::ResourceMissing("buffers")));
    assert_eq!(session.state(), SessionState::Disposed);
    assert!(session.pending_frame().is_none());
    assert!(log.borrow().listeners.is_empty());
    assert!(calls(&log).contains(&Call::ReleaseContext));
    assert!(matches!(
        session.tick(),
        Err(SessionError::Lifecycle(SessionState::Disposed))
    ));
}

#[test]
fn every_successful_frame_schedules_the_next() {
    let (mut session, log) = running(SessionOptions::default(), Viewport::new(64, 64));
    for _ in 0..3 {
        session.tick().unwrap();
    }
    let requests = calls(&log)
        .iter()
        .filter(|call| matches!(call, Call::RequestFrame(_)))
        .count();
    assert_eq!(requests, 4);
    assert!(session.pending_frame().is_some());
    assert_eq!(session.frame_count(), 3);
}

#[test]
fn starting_twice_is_rejected() {
    let (mut session, log) = running(SessionOptions::default(), Viewport::new(64, 64));
    let err = start(&mut session, &log).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Lifecycle(SessionState::Running)
    ));
}

#[test]
fn seed_is_identical_across_every_frame() {
    let (mut session, log) = running(
        SessionOptions::new(ProgramVariant::StarryNight).with_seed(1234),
        Viewport::new(200, 100),
    );
    for _ in 0..20 {
        session.tick().unwrap();
    }

    let draws = draws(&log);
    let seed = draws[0].seed;
    assert_ne!(seed, [0.0, 0.0]);
    assert!(draws.iter().all(|block| block.seed == seed));
}

#[test]
fn bursty_interaction_steps_once_per_frame() {
    let rates = InteractionRates::new(0.25, 0.5).unwrap();
    let (mut session, log) = running(
        SessionOptions::new(ProgramVariant::BlackHole).with_rates(rates),
        Viewport::new(100, 100),
    );

    for _ in 0..10 {
        emit(&log, SessionEvent::Interaction(InteractionEvent::PointerEnter));
    }
    let intensities: Vec<f32> = (0..3)
        .map(|_| session.tick().unwrap().intensity)
        .collect();
    assert_eq!(intensities, vec![0.25, 0.5, 0.75]);

    emit(&log, SessionEvent::Interaction(InteractionEvent::TouchEnd));
    assert_eq!(session.tick().unwrap().intensity, 0.25);
    assert_eq!(session.tick().unwrap().intensity, 0.0);
    assert_eq!(session.tick().unwrap().intensity, 0.0);

    let last = *draws(&log).last().unwrap();
    assert_eq!(last.intensity, 0.0);
}

#[test]
fn pointer_is_stored_with_a_bottom_left_origin() {
    let (mut session, log) = running(SessionOptions::default(), Viewport::new(800, 600));
    emit(&log, SessionEvent::PointerMoved { x: 100.0, y: 50.0 });
    session.tick().unwrap();
    assert_eq!(draws(&log)[0].pointer, [100.0, 550.0]);
}

#[test]
fn programs_ignore_uniforms_they_do_not_declare() {
    let (mut session, log) = running(SessionOptions::default(), Viewport::new(800, 600));
    emit(&log, SessionEvent::Interaction(InteractionEvent::PointerEnter));
    session.tick().unwrap();

    let block = draws(&log)[0];
    assert_eq!(block.intensity, 0.0);
    assert_eq!(block.seed, [0.0, 0.0]);
    assert!(session.intensity() > 0.0);
}

#[test]
fn time_comes_from_the_session_clock() {
    let log = Shared::default();
    let mut session = new_session(SessionOptions::default(), Viewport::new(64, 64), &log)
        .with_time_source(SteppedTimeSource::new(Duration::from_millis(500)));
    start(&mut session, &log).unwrap();

    let times: Vec<f32> = (0..3).map(|_| session.tick().unwrap().time).collect();
    assert_eq!(times, vec![0.0, 0.5, 1.0]);
    assert!(draws(&log).iter().map(|block| block.time).eq(times));
}
