use crate::clock::Clock;
use crate::codec;
use crate::codec::ClientMessage;
use crate::codec::CodecError;
use crate::codec::ControlCommand;
use crate::codec::ControlFrame;
use crate::codec::HelloFrame;
use crate::codec::Role;
use crate::codec::SpectateMode;
use crate::intent::ConnId;
use crate::intent::Endpoint;
use crate::intent::Intent;
use crate::intent::Outbox;
use crate::message::ActBody;
use crate::message::ActTable;
use crate::message::ActYou;
use crate::message::ConfigBody;
use crate::message::ErrorCode;
use crate::message::FinalStack;
use crate::message::LobbyPlayer;
use crate::message::PlayerPublic;
use crate::message::ServerMessage;
use crate::message::SnapshotBody;
use crate::message::SnapshotYou;
use crate::message::SpectatorMessage;
use crate::message::SpectatorSeat;
use crate::message::SpectatorSnapshot;
use crate::message::StackEntry;
use crate::message::WinnerBody;
use crate::options::HostConfig;
use crate::registry::ClaimError;
use crate::registry::Registry;
use crate::status::TableStatus;
use crate::table::Table;
use arena_core::Chips;
use arena_core::Position;
use arena_core::TABLE_ID;
use arena_gameplay::ActionError;
use arena_gameplay::ActionKind;
use arena_gameplay::Controller;
use arena_gameplay::Engine;
use arena_gameplay::HandControl;
use arena_gameplay::HandEvent;
use arena_gameplay::PlayerAction;
use std::collections::HashMap;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Channel endpoints handed to the transport layer.
pub struct RoomHandle {
    pub intents: UnboundedSender<Intent>,
    pub done: oneshot::Receiver<()>,
}

/// The session loop: a single task that owns every piece of game state.
///
/// Transports submit [`Intent`]s; the room applies engine transitions and
/// fans the resulting events out through the [`Table`]. Because everything
/// runs on this one task, no transition ever interleaves with another and
/// no lock is needed. The only suspension points are the intent inbox and
/// the decision-clock deadline.
pub struct Room {
    config: HostConfig,
    engine: Engine,
    controller: Controller,
    registry: Registry,
    clock: Clock,
    table: Table,
    inbox: UnboundedReceiver<Intent>,
    outboxes: HashMap<ConnId, Outbox>,
    pending_hello: HashMap<ConnId, Endpoint>,
    /// Seat holding an outstanding `act` prompt.
    prompted: Option<Position>,
    /// Seats condemned to bust out when the current hand settles.
    forfeited: HashSet<Position>,
    /// Chip-conservation baseline, fixed when the first hand starts and
    /// lowered only by forfeits.
    baseline: Option<Chips>,
    last_status: Option<TableStatus>,
    done: Option<oneshot::Sender<()>>,
    match_over: bool,
}

impl Room {
    pub fn new(config: HostConfig) -> (Self, RoomHandle) {
        let (intents, inbox) = unbounded_channel();
        let (done_tx, done_rx) = oneshot::channel();
        let room = Self {
            engine: Engine::new(config.table.clone()),
            controller: Controller::new(config.hand_control),
            registry: Registry::new(config.require_join_code),
            clock: Clock::new(config.table.move_time_ms, config.clock),
            table: Table::new(config.table.seats),
            inbox,
            outboxes: HashMap::new(),
            pending_hello: HashMap::new(),
            prompted: None,
            forfeited: HashSet::new(),
            baseline: None,
            last_status: None,
            done: Some(done_tx),
            match_over: false,
            config,
        };
        let handle = RoomHandle {
            intents,
            done: done_rx,
        };
        (room, handle)
    }

    /// Drives the table until the intent channel closes. Suspends only on
    /// the inbox and on the armed decision deadline; every engine
    /// transition runs to completion in between.
    pub async fn run(mut self) {
        log::info!("[room] serving table {}", TABLE_ID);
        loop {
            let deadline = self.clock.deadline();
            tokio::select! {
                biased;
                intent = self.inbox.recv() => match intent {
                    Some(intent) => self.handle(intent),
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(far_future)), if deadline.is_some() => {
                    self.on_timeout();
                }
            }
        }
        log::info!("[room] intent channel closed, shutting down");
    }

    fn handle(&mut self, intent: Intent) {
        match intent {
            Intent::Opened {
                conn,
                endpoint,
                outbox,
            } => {
                self.outboxes.insert(conn, outbox);
                self.pending_hello.insert(conn, endpoint);
            }
            Intent::Frame { conn, text } => self.on_frame(conn, text),
            Intent::Closed { conn } => self.on_closed(conn),
        }
    }
}

/// Frame routing.
impl Room {
    fn on_frame(&mut self, conn: ConnId, text: String) {
        if let Some(endpoint) = self.pending_hello.get(&conn).copied() {
            return self.on_first_frame(conn, endpoint, &text);
        }
        if let Some(seat) = self.registry.seat_of(conn) {
            return self.on_bot_frame(conn, seat, &text);
        }
        if self.table.is_spectator(conn) {
            return self.on_spectator_frame(conn, &text);
        }
        log::debug!("[room] frame from unknown conn {}", conn);
    }

    fn on_first_frame(&mut self, conn: ConnId, endpoint: Endpoint, text: &str) {
        let hello = match codec::decode(text) {
            Ok(ClientMessage::Hello(hello)) => hello,
            Ok(_) | Err(_) => {
                self.send_error(conn, ErrorCode::BadHello, "Expected hello");
                self.drop_conn(conn);
                return;
            }
        };
        match endpoint {
            Endpoint::Bots => self.on_bot_hello(conn, hello),
            Endpoint::Spectators => self.on_spectator_hello(conn, hello),
        }
    }

    fn on_bot_frame(&mut self, conn: ConnId, seat: Position, text: &str) {
        match codec::decode(text) {
            Ok(ClientMessage::Action(frame)) => self.on_action(conn, seat, frame),
            Ok(ClientMessage::Hello(_)) => {
                log::debug!("[room] duplicate hello from P{}", seat)
            }
            Ok(ClientMessage::Control(_)) => {
                log::debug!("[room] control frame from non-operator P{}", seat)
            }
            Err(CodecError::Malformed(reason)) => {
                self.send_error(conn, ErrorCode::BadSchema, reason)
            }
            Err(CodecError::UnknownType(kind)) => self.send_error(
                conn,
                ErrorCode::UnknownType,
                format!("Unsupported message type: {}", kind),
            ),
        }
    }

    fn on_spectator_frame(&mut self, conn: ConnId, text: &str) {
        match codec::decode(text) {
            Ok(ClientMessage::Control(frame)) => self.on_control(conn, frame),
            // spectators have no other inbound surface; everything else is
            // dropped without ceremony
            Ok(_) | Err(_) => {}
        }
    }
}

/// Hello handling.
impl Room {
    fn on_bot_hello(&mut self, conn: ConnId, hello: HelloFrame) {
        if hello.role.is_some() {
            self.send_error(conn, ErrorCode::BadHello, "Spectators connect on /spectate");
            self.drop_conn(conn);
            return;
        }
        let team = match hello.team.as_deref().map(str::trim) {
            Some(team) if !team.is_empty() => team.to_string(),
            _ => {
                self.send_error(conn, ErrorCode::BadSchema, "team required");
                self.drop_conn(conn);
                return;
            }
        };
        let claim = match self.registry.claim(
            &mut self.engine,
            conn,
            &team,
            hello.join_code.as_deref(),
        ) {
            Ok(claim) => claim,
            Err(error) => {
                let code = match error {
                    ClaimError::TableFull => ErrorCode::TableFull,
                    ClaimError::TeamUnknown => ErrorCode::TeamUnknown,
                };
                self.send_error(conn, code, error.to_string());
                self.drop_conn(conn);
                return;
            }
        };
        self.pending_hello.remove(&conn);
        if let Some(old) = claim.replaced {
            // the displaced socket closes once its mailbox is gone
            self.outboxes.remove(&old);
            log::info!("[room] conn {} replaced by {} on P{}", old, conn, claim.seat);
        }
        let outbox = self.outboxes.get(&conn).expect("opened conn").clone();
        self.table.bind_seat(claim.seat, outbox);

        self.unicast(
            claim.seat,
            ServerMessage::Welcome {
                table_id: TABLE_ID.to_string(),
                seat: claim.seat,
                config: self.config_body(),
            },
        );
        self.broadcast_lobby();
        self.broadcast_spectator_snapshot();

        if self.engine.hand().is_some() {
            let snapshot = self.snapshot_body(claim.seat);
            self.unicast(claim.seat, ServerMessage::Snapshot(snapshot));
            if self.prompted == Some(claim.seat) {
                // the hand was waiting on this seat; resume its clock and
                // repeat the outstanding prompt
                self.clock.resume(claim.seat);
                self.send_act(claim.seat);
            }
        } else {
            self.try_start_hand(false);
        }
        self.refresh_status();
    }

    fn on_spectator_hello(&mut self, conn: ConnId, hello: HelloFrame) {
        let role = match hello.role {
            Some(role) => role,
            None => {
                self.send_error(conn, ErrorCode::BadHello, "role required on /spectate");
                self.drop_conn(conn);
                return;
            }
        };
        self.pending_hello.remove(&conn);
        let outbox = self.outboxes.get(&conn).expect("opened conn").clone();
        let paced = role == Role::Spectator
            && match hello.mode {
                Some(SpectateMode::Presentation) => true,
                Some(SpectateMode::Live) => false,
                None => self.config.presentation,
            };
        let mailbox = if paced {
            self.spawn_pacer(outbox.clone())
        } else {
            outbox.clone()
        };
        self.table
            .add_spectator(conn, mailbox, role == Role::Operator);
        log::info!(
            "[room] {:?} connected ({} mode)",
            role,
            if paced { "presentation" } else { "live" }
        );

        // welcome and catch-up state go straight to the socket, unpaced
        let _ = outbox.send(
            SpectatorMessage::Welcome {
                table_id: TABLE_ID.to_string(),
                config: self.config_body(),
            }
            .to_json(),
        );
        let _ = outbox.send(
            SpectatorMessage::Lobby {
                players: self.lobby_players(),
            }
            .to_json(),
        );
        if let Some(snapshot) = self.spectator_snapshot() {
            let _ = outbox.send(SpectatorMessage::Snapshot(snapshot).to_json());
        }
        if role == Role::Operator {
            let _ = outbox.send(SpectatorMessage::Status(self.table_status()).to_json());
        }
    }

    /// Inserts a FIFO-with-delay between the room and one spectator
    /// socket. Order is preserved; only spectators ever wait.
    fn spawn_pacer(&self, downstream: Outbox) -> Outbox {
        let (paced, mut feed) = unbounded_channel::<String>();
        let delay = Duration::from_millis(self.config.presentation_delay_ms);
        tokio::spawn(async move {
            while let Some(frame) = feed.recv().await {
                tokio::time::sleep(delay).await;
                if downstream.send(frame).is_err() {
                    break;
                }
            }
        });
        paced
    }
}

/// Action handling.
impl Room {
    fn on_action(&mut self, conn: ConnId, seat: Position, frame: crate::codec::ActionFrame) {
        let live_hand = self
            .engine
            .hand()
            .map(|h| h.hand_id().to_string())
            .filter(|id| id == &frame.hand_id);
        if live_hand.is_none() {
            self.send_error(conn, ErrorCode::ActionTooLate, "Hand no longer active");
            return;
        }
        let action = match frame.action {
            ActionKind::Fold => PlayerAction::Fold,
            ActionKind::Check => PlayerAction::Check,
            ActionKind::Call => PlayerAction::Call,
            ActionKind::RaiseTo => match frame.amount {
                Some(amount) => PlayerAction::RaiseTo(amount),
                None => {
                    self.send_error(conn, ErrorCode::BadSchema, "amount required for raise");
                    return;
                }
            },
        };
        match self.engine.apply(seat, action) {
            Ok(events) => {
                log::debug!("[room] P{} played {}", seat, action);
                self.clock.cancel();
                self.prompted = None;
                self.after_transition(events);
            }
            Err(ActionError::OutOfTurn) => {
                self.send_error(conn, ErrorCode::OutOfTurn, "Not your turn");
            }
            Err(error) => {
                // state untouched; the seat still owes an action and its
                // clock keeps running
                log::warn!("[room] rejected action from P{}: {}", seat, error);
                self.send_error(conn, ErrorCode::InvalidAction, error.to_string());
            }
        }
    }

    fn on_timeout(&mut self) {
        let Some(seat) = self.clock.seat() else {
            return;
        };
        self.clock.cancel();
        self.prompted = None;
        let action = match self.engine.fallback(seat) {
            Ok(action) => action,
            Err(error) => {
                log::error!("[room] no fallback for P{}: {}", seat, error);
                return;
            }
        };
        log::info!("[room] clock expired, forcing {} for P{}", action, seat);
        match self.engine.apply(seat, action) {
            Ok(events) => self.after_transition(events),
            Err(error) => log::error!("[room] fallback rejected for P{}: {}", seat, error),
        }
    }

    /// Broadcasts a transition's burst, checks the chip ledger, then either
    /// settles the hand or keeps the turn machinery in sync.
    fn after_transition(&mut self, events: Vec<HandEvent>) {
        self.broadcast_events(&events);
        if let Some(baseline) = self.baseline {
            let total = self.engine.total_chips();
            if total != baseline {
                log::error!(
                    "[room] chip conservation violated: {} != {}",
                    total,
                    baseline
                );
                self.abort_match();
                return;
            }
        }
        self.broadcast_spectator_snapshot();
        if self.engine.is_hand_complete() {
            self.finish_hand();
        } else {
            self.sync_prompt();
        }
        self.refresh_status();
    }

    /// Re-prompts only when the acting seat actually changed, so a
    /// bystander fold never restarts the actor's clock.
    fn sync_prompt(&mut self) {
        let actor = self.engine.next_actor();
        if actor == self.prompted {
            return;
        }
        self.clock.cancel();
        self.prompted = None;
        if let Some(seat) = actor {
            self.prompt(seat);
        }
    }

    fn prompt(&mut self, seat: Position) {
        self.prompted = Some(seat);
        self.clock.arm(seat);
        let connected = self
            .engine
            .seat(seat)
            .map(|s| s.connected)
            .unwrap_or(false);
        if !connected {
            // hand waits for the seat under the pause policy; under wall
            // clock the countdown keeps running toward the auto-action
            self.clock.pause(seat);
        }
        self.send_act(seat);
    }
}

/// Operator control.
impl Room {
    fn on_control(&mut self, conn: ConnId, frame: ControlFrame) {
        if !self.table.is_operator(conn) {
            return;
        }
        match frame.command {
            ControlCommand::StartHand => {
                if self.controller.control() == HandControl::Operator {
                    self.try_start_hand(true);
                }
            }
            ControlCommand::SkipAction => self.on_skip(),
            ControlCommand::ForfeitSeat => {
                if let Some(seat) = frame.seat {
                    self.on_forfeit(seat);
                }
            }
        }
        self.refresh_status();
    }

    /// Operator skip is an immediate clock expiry for the acting seat.
    fn on_skip(&mut self) {
        let Some(seat) = self.engine.next_actor() else {
            return;
        };
        self.clock.cancel();
        self.prompted = None;
        let Ok(action) = self.engine.fallback(seat) else {
            return;
        };
        log::info!("[room] operator skip, forcing {} for P{}", action, seat);
        match self.engine.apply(seat, action) {
            Ok(events) => self.after_transition(events),
            Err(error) => log::error!("[room] skip rejected for P{}: {}", seat, error),
        }
    }

    /// Forfeit folds the seat out of the live hand immediately and burns
    /// its remaining stack at settlement; outside a hand the bust is
    /// immediate.
    fn on_forfeit(&mut self, seat: Position) {
        if self.engine.seat(seat).is_none() || self.match_over {
            return;
        }
        if self.engine.hand().is_some() {
            self.forfeited.insert(seat);
            if self.prompted == Some(seat) {
                self.clock.cancel();
                self.prompted = None;
            }
            log::info!("[room] operator forfeit of P{} during hand", seat);
            let events = self.engine.forfeit(seat);
            self.after_transition(events);
        } else {
            log::info!("[room] operator forfeit of P{} between hands", seat);
            self.burn_stack(seat);
            let eliminations = self.controller.eliminations(&self.engine);
            self.broadcast_events(&eliminations);
            self.broadcast_lobby();
            if self.controller.is_match_over(&self.engine) {
                self.end_match();
            }
        }
    }

    fn burn_stack(&mut self, seat: Position) {
        if let Some(player) = self.engine.seat_mut(seat) {
            let burned = player.stack;
            player.stack = 0;
            if burned > 0 {
                self.baseline = self.baseline.map(|b| b - burned);
                log::info!("[room] P{} forfeits {} chips", seat, burned);
            }
        }
    }
}

/// Hand lifecycle.
impl Room {
    fn try_start_hand(&mut self, operator_initiated: bool) {
        if self.match_over || self.engine.hand().is_some() {
            return;
        }
        if self.controller.control() == HandControl::Operator && !operator_initiated {
            return;
        }
        if !self.engine.can_start() {
            return;
        }
        let Some(button) = self.controller.rotate_button(&self.engine) else {
            return;
        };
        let hand_id = self.controller.next_hand_id();
        let seed: u64 = rand::random();
        let events = match self.engine.start_hand(hand_id.clone(), button, seed) {
            Ok(events) => events,
            Err(error) => {
                log::warn!("[room] failed to start hand: {}", error);
                return;
            }
        };
        if self.baseline.is_none() {
            self.baseline = Some(self.engine.total_chips());
        }
        log::info!("[room] {} started, button P{}", hand_id, button);
        let stacks = self.pre_hand_stacks();
        self.table.broadcast_players(&ServerMessage::StartHand {
            hand_id: hand_id.clone(),
            seed,
            button,
            stacks: stacks.clone(),
        });
        self.table
            .broadcast_spectators(&SpectatorMessage::StartHand {
                hand_id,
                seed,
                button,
                stacks,
            });
        self.broadcast_events(&events);
        self.broadcast_spectator_snapshot();
        self.sync_prompt();
        self.refresh_status();
    }

    fn finish_hand(&mut self) {
        let hand_id = self
            .engine
            .hand()
            .map(|h| h.hand_id().to_string())
            .unwrap_or_default();
        let condemned: Vec<Position> = self.forfeited.drain().collect();
        for seat in condemned {
            self.burn_stack(seat);
        }
        let eliminations = self.controller.eliminations(&self.engine);
        self.broadcast_events(&eliminations);

        let stacks: Vec<StackEntry> = self
            .engine
            .occupied()
            .map(|s| StackEntry {
                seat: s.index,
                stack: s.stack,
            })
            .collect();
        log::info!("[room] {} finished", hand_id);
        self.table.broadcast_players(&ServerMessage::EndHand {
            hand_id: hand_id.clone(),
            stacks: stacks.clone(),
        });
        self.table
            .broadcast_spectators(&SpectatorMessage::EndHand { hand_id, stacks });

        self.engine.clear_hand();
        self.clock.cancel();
        self.prompted = None;
        if self.controller.is_match_over(&self.engine) {
            self.end_match();
        } else {
            self.try_start_hand(false);
        }
    }

    fn end_match(&mut self) {
        self.match_over = true;
        self.clock.cancel();
        self.prompted = None;
        let winner = self.controller.winner(&self.engine).and_then(|pos| {
            self.engine.seat(pos).map(|s| WinnerBody {
                seat: pos,
                team: s.team.clone(),
            })
        });
        let final_stacks: Vec<FinalStack> = self
            .engine
            .occupied()
            .map(|s| FinalStack {
                seat: s.index,
                team: s.team.clone(),
                stack: s.stack,
            })
            .collect();
        log::info!(
            "[room] match over, winner {:?}",
            winner.as_ref().map(|w| w.seat)
        );
        self.table.broadcast_players(&ServerMessage::MatchEnd {
            winner: winner.clone(),
            final_stacks: final_stacks.clone(),
        });
        self.table.broadcast_spectators(&SpectatorMessage::MatchEnd {
            winner,
            final_stacks,
        });
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
    }

    /// Invariant breach: stop producing hands and report a winnerless end.
    fn abort_match(&mut self) {
        log::error!("[room] aborting match on internal invariant violation");
        self.engine.clear_hand();
        self.clock.cancel();
        self.prompted = None;
        let final_stacks: Vec<FinalStack> = self
            .engine
            .occupied()
            .map(|s| FinalStack {
                seat: s.index,
                team: s.team.clone(),
                stack: s.stack,
            })
            .collect();
        self.match_over = true;
        self.table.broadcast_players(&ServerMessage::MatchEnd {
            winner: None,
            final_stacks: final_stacks.clone(),
        });
        self.table.broadcast_spectators(&SpectatorMessage::MatchEnd {
            winner: None,
            final_stacks,
        });
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
    }
}

/// Connection lifecycle.
impl Room {
    fn on_closed(&mut self, conn: ConnId) {
        self.pending_hello.remove(&conn);
        self.outboxes.remove(&conn);
        if self.table.is_spectator(conn) {
            self.table.remove_spectator(conn);
            log::info!("[room] spectator {} disconnected", conn);
            return;
        }
        if let Some(seat) = self.registry.disconnect(&mut self.engine, conn) {
            self.table.unbind_seat(seat);
            if self.prompted == Some(seat) {
                // mid-turn drop: the clock pauses under the tournament
                // policy and the seat is never auto-folded for the crash
                self.clock.pause(seat);
            }
            self.broadcast_lobby();
            self.broadcast_spectator_snapshot();
            self.refresh_status();
        }
    }

    fn drop_conn(&mut self, conn: ConnId) {
        self.pending_hello.remove(&conn);
        self.table.remove_spectator(conn);
        self.outboxes.remove(&conn);
    }
}

/// Outbound helpers.
impl Room {
    fn unicast(&self, seat: Position, message: ServerMessage) {
        self.table.unicast(seat, &message);
    }
    fn send_error(&self, conn: ConnId, code: ErrorCode, msg: impl Into<String>) {
        if let Some(outbox) = self.outboxes.get(&conn) {
            let _ = outbox.send(ServerMessage::error(code, msg).to_json());
        }
    }
    fn broadcast_events(&self, events: &[HandEvent]) {
        for event in events {
            log::debug!("[room] event: {}", event);
            self.table.broadcast_players(&ServerMessage::Event {
                event: event.clone(),
            });
            self.table.broadcast_spectators(&SpectatorMessage::Event {
                event: event.clone(),
            });
        }
    }
    fn broadcast_lobby(&self) {
        let players = self.lobby_players();
        self.table.broadcast_players(&ServerMessage::Lobby {
            players: players.clone(),
        });
        self.table
            .broadcast_spectators(&SpectatorMessage::Lobby { players });
    }
    fn broadcast_spectator_snapshot(&self) {
        if !self.table.has_spectators() {
            return;
        }
        if let Some(snapshot) = self.spectator_snapshot() {
            self.table
                .broadcast_spectators(&SpectatorMessage::Snapshot(snapshot));
        }
    }
    fn refresh_status(&mut self) {
        let status = self.table_status();
        if self.last_status != Some(status) {
            self.last_status = Some(status);
            self.table
                .broadcast_operators(&SpectatorMessage::Status(status));
        }
    }
    fn send_act(&mut self, seat: Position) {
        let Some(body) = self.act_body(seat) else {
            return;
        };
        log::debug!("[room] prompting P{}", seat);
        self.unicast(seat, ServerMessage::Act(body));
    }
}

/// Payload builders.
impl Room {
    fn config_body(&self) -> ConfigBody {
        let table = &self.config.table;
        ConfigBody {
            variant: table.variant.clone(),
            seats: table.seats,
            starting_stack: table.starting_stack,
            sb: table.sb,
            bb: table.bb,
            move_time_ms: table.move_time_ms,
        }
    }
    fn lobby_players(&self) -> Vec<LobbyPlayer> {
        self.engine
            .occupied()
            .map(|s| LobbyPlayer {
                seat: s.index,
                team: s.team.clone(),
                connected: s.connected,
                stack: s.stack,
            })
            .collect()
    }
    fn players_public(&self) -> Vec<PlayerPublic> {
        self.engine
            .occupied()
            .map(|s| PlayerPublic {
                seat: s.index,
                stack: s.stack,
                has_folded: s.has_folded,
                committed: s.committed,
            })
            .collect()
    }
    /// Stacks as they stood before the blinds, for `start_hand`.
    fn pre_hand_stacks(&self) -> Vec<StackEntry> {
        self.engine
            .occupied()
            .map(|s| StackEntry {
                seat: s.index,
                stack: s.stack + s.total_in_pot,
            })
            .collect()
    }
    fn act_body(&self, seat: Position) -> Option<ActBody> {
        let hand = self.engine.hand()?;
        let player = self.engine.seat(seat)?;
        let window = self.engine.window(seat).ok()?;
        Some(ActBody {
            hand_id: hand.hand_id().to_string(),
            seat,
            phase: hand.phase(),
            pot: hand.pot(),
            current_bet: hand.current_bet(),
            min_raise_increment: hand.min_raise_increment(),
            you: ActYou {
                hole: player.hole.map(|h| h.labels()).unwrap_or_default(),
                stack: player.stack,
                committed: player.committed,
                to_call: window.to_call,
                time_ms: self.clock.remaining_ms(),
            },
            table: ActTable {
                sb: self.config.table.sb,
                bb: self.config.table.bb,
                seats: self.config.table.seats,
                button: hand.button(),
            },
            players: self.players_public(),
            community: hand.community_labels(),
            legal: window.legal,
            call_amount: window.call_amount,
            min_raise_to: window.min_raise_to,
            max_raise_to: window.max_raise_to,
        })
    }
    fn snapshot_body(&self, seat: Position) -> SnapshotBody {
        let hand = self.engine.hand().expect("snapshot needs a hand");
        let player = self.engine.seat(seat).expect("snapshot needs a seat");
        let next_actor = self.engine.next_actor();
        let window = (next_actor == Some(seat))
            .then(|| self.engine.window(seat).ok())
            .flatten();
        SnapshotBody {
            at_hand_id: hand.hand_id().to_string(),
            phase: hand.phase(),
            you: SnapshotYou {
                seat,
                hole: player.hole.map(|h| h.labels()).unwrap_or_default(),
                stack: player.stack,
                to_call: hand.current_bet().saturating_sub(player.committed),
            },
            players: self.players_public(),
            community: hand.community_labels(),
            next_actor,
            time_ms_remaining: self.clock.remaining_ms(),
            legal: window.as_ref().map(|w| w.legal.clone()),
            call_amount: window.as_ref().and_then(|w| w.call_amount),
            min_raise_to: window.as_ref().and_then(|w| w.min_raise_to),
            max_raise_to: window.as_ref().and_then(|w| w.max_raise_to),
        }
    }
    fn spectator_snapshot(&self) -> Option<SpectatorSnapshot> {
        let hand = self.engine.hand()?;
        let next_actor = self.engine.next_actor();
        Some(SpectatorSnapshot {
            hand_id: hand.hand_id().to_string(),
            table_id: TABLE_ID.to_string(),
            pot: hand.pot(),
            phase: hand.phase(),
            community: hand.community_labels(),
            seats: self
                .engine
                .occupied()
                .map(|s| SpectatorSeat {
                    seat: s.index,
                    team: s.team.clone(),
                    stack: s.stack,
                    committed: s.committed,
                    hole: s.hole.map(|h| h.labels()).unwrap_or_default(),
                    has_folded: s.has_folded,
                    connected: s.connected,
                    is_button: hand.button() == s.index,
                })
                .collect(),
            next_actor,
            time_remaining_ms: next_actor.map(|_| self.clock.remaining_ms()),
            sb: self.config.table.sb,
            bb: self.config.table.bb,
        })
    }
    fn table_status(&self) -> TableStatus {
        let in_hand = self.engine.hand().is_some();
        let can_start = !self.match_over && self.engine.can_start();
        let chip_holders: Vec<_> = self
            .engine
            .occupied()
            .filter(|s| s.stack > 0)
            .collect();
        let players_ready = !chip_holders.is_empty() && chip_holders.iter().all(|s| s.connected);
        let awaiting_manual_start = self.controller.control() == HandControl::Operator
            && !in_hand
            && !self.match_over;
        TableStatus {
            in_hand,
            awaiting_manual_start,
            manual_start_armed: awaiting_manual_start && can_start,
            players_ready,
            can_start,
        }
    }
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86_400)
}
