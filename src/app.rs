//! Screen state machine tying the session, the services and the screens together.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::api::{EntityService, Transport};
use crate::config::Config;
use crate::error::ServiceError;
use crate::models::{Client, Employee, Entity, EntityKind, Product};
use crate::routes::Route;
use crate::session::Session;
use crate::ui::entity_form::{self, EntityFormState, FormAction, FormMode};
use crate::ui::entity_list::{self, EntityListState, ListAction};
use crate::ui::home::{self, HomeAction, HomeState};
use crate::ui::login::{self, LoginAction, LoginState};
use crate::ui::notifications::Notifications;

// Represents the current screen in the app
pub enum Screen {
    Login(LoginState),
    Home(HomeState),
    ClientList(EntityListState<Client>),
    ClientForm(EntityFormState<Client>),
    EmployeeList(EntityListState<Employee>),
    EmployeeForm(EntityFormState<Employee>),
    ProductList(EntityListState<Product>),
    ProductForm(EntityFormState<Product>),
}

/// Completion of a backend call, applied on the UI loop.
pub type Reply<T> = Box<dyn FnOnce(&mut App<T>) + Send>;

/// Ties an entity to its service and to the screen variants that show it.
pub trait Routed: Entity {
    fn service<T: Transport>(app: &App<T>) -> &EntityService<Self, T>;
    fn list_mut(screen: &mut Screen) -> Option<&mut EntityListState<Self>>;
    fn form_mut(screen: &mut Screen) -> Option<&mut EntityFormState<Self>>;
    fn list_screen(state: EntityListState<Self>) -> Screen;
    fn form_screen(state: EntityFormState<Self>) -> Screen;
}

macro_rules! routed {
    ($entity:ty, $service:ident, $list:ident, $form:ident) => {
        impl Routed for $entity {
            fn service<T: Transport>(app: &App<T>) -> &EntityService<Self, T> {
                &app.$service
            }

            fn list_mut(screen: &mut Screen) -> Option<&mut EntityListState<Self>> {
                match screen {
                    Screen::$list(state) => Some(state),
                    _ => None,
                }
            }

            fn form_mut(screen: &mut Screen) -> Option<&mut EntityFormState<Self>> {
                match screen {
                    Screen::$form(state) => Some(state),
                    _ => None,
                }
            }

            fn list_screen(state: EntityListState<Self>) -> Screen {
                Screen::$list(state)
            }

            fn form_screen(state: EntityFormState<Self>) -> Screen {
                Screen::$form(state)
            }
        }
    };
}

routed!(Client, clients, ClientList, ClientForm);
routed!(Employee, employees, EmployeeList, EmployeeForm);
routed!(Product, products, ProductList, ProductForm);

// Main application state
pub struct App<T: Transport> {
    session: Session,
    clients: EntityService<Client, T>,
    employees: EntityService<Employee, T>,
    products: EntityService<Product, T>,
    screen: Screen,
    route: Route,
    /// Route to open once the user logs in.
    landing: Option<Route>,
    notifications: Notifications,
    /// Bumped on every navigation; replies from an older screen are dropped.
    generation: u64,
    replies: UnboundedSender<Reply<T>>,
    narrow_width: u16,
    should_quit: bool,
}

impl<T: Transport> App<T> {
    pub fn new(config: &Config, transport: Arc<T>, session: Session) -> (Self, UnboundedReceiver<Reply<T>>) {
        let (replies, receiver) = mpsc::unbounded_channel();
        let root = config.proxy_root();

        let app = Self {
            session,
            clients: EntityService::new(Arc::clone(&transport), &root),
            employees: EntityService::new(Arc::clone(&transport), &root),
            products: EntityService::new(transport, &root),
            screen: Screen::Login(LoginState::new()),
            route: Route::Login,
            landing: None,
            notifications: Notifications::new(config.notification_ttl()),
            generation: 0,
            replies,
            narrow_width: config.narrow_width,
            should_quit: false,
        };

        (app, receiver)
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn narrow_width(&self) -> u16 {
        self.narrow_width
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_landing(&mut self, route: Route) {
        self.landing = Some(route);
    }

    /// Expires stale notifications.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.prune(now);
    }

    /// Switches screens. Routes other than login are gated on the session.
    pub fn navigate(&mut self, route: Route) {
        self.generation += 1;

        if route.requires_auth() && !self.session.is_authenticated() {
            warn!(%route, "not logged in, showing login");
            if route != Route::Home {
                self.landing = Some(route);
            }
            self.route = Route::Login;
            self.screen = Screen::Login(LoginState::new());
            return;
        }

        info!(%route, "navigating");
        self.route = route;

        match route {
            Route::Login => self.screen = Screen::Login(LoginState::new()),
            Route::Home => self.screen = Screen::Home(HomeState::new()),
            Route::List(kind) => match kind {
                EntityKind::Client => self.open_list::<Client>(),
                EntityKind::Employee => self.open_list::<Employee>(),
                EntityKind::Product => self.open_list::<Product>(),
            },
            Route::Create(kind) => self.open_form_for(kind, FormMode::Create),
            Route::View(kind, id) => self.open_form_for(kind, FormMode::View(id)),
            Route::Edit(kind, id) => self.open_form_for(kind, FormMode::Edit(id)),
        }
    }

    fn open_form_for(&mut self, kind: EntityKind, mode: FormMode) {
        match kind {
            EntityKind::Client => self.open_form::<Client>(mode),
            EntityKind::Employee => self.open_form::<Employee>(mode),
            EntityKind::Product => self.open_form::<Product>(mode),
        }
    }

    /// Runs a backend call off the UI loop. Its result is applied only if the
    /// screen that issued it is still showing.
    fn spawn<R, F, A>(&self, task: F, apply: A)
    where
        R: Send + 'static,
        F: Future<Output = R> + Send + 'static,
        A: FnOnce(&mut App<T>, R) + Send + 'static,
    {
        let replies = self.replies.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let result = task.await;
            let reply: Reply<T> = Box::new(move |app: &mut App<T>| {
                if app.generation != generation {
                    debug!(generation, current = app.generation, "dropping reply for a closed screen");
                    return;
                }
                apply(app, result);
            });
            if replies.send(reply).is_err() {
                debug!("reply channel closed");
            }
        });
    }

    fn open_list<E: Routed>(&mut self) {
        self.screen = E::list_screen(EntityListState::loading());
        self.fetch_list::<E>();
    }

    fn fetch_list<E: Routed>(&mut self) {
        let service = E::service(self).clone();
        self.spawn(async move { service.list().await }, |app, result| app.on_listed::<E>(result));
    }

    fn on_listed<E: Routed>(&mut self, result: Result<Vec<E>, ServiceError>) {
        let Some(list) = E::list_mut(&mut self.screen) else {
            return;
        };
        match result {
            Ok(records) => {
                debug!(entity = %E::KIND, count = records.len(), "records loaded");
                list.set_records(records);
            }
            Err(err) => {
                error!(entity = %E::KIND, %err, "failed to load records");
                list.set_failed();
            }
        }
    }

    fn open_form<E: Routed>(&mut self, mode: FormMode) {
        self.screen = E::form_screen(EntityFormState::new(mode));

        if let Some(id) = mode.id() {
            let service = E::service(self).clone();
            self.spawn(async move { service.get_by_id(id).await }, move |app, result| {
                app.on_loaded::<E>(id, result)
            });
        }
    }

    fn on_loaded<E: Routed>(&mut self, id: i32, result: Result<E, ServiceError>) {
        match result {
            Ok(record) => {
                if let Some(form) = E::form_mut(&mut self.screen) {
                    form.populate(&record);
                }
            }
            Err(err) => {
                if err.is_not_found() {
                    warn!(entity = %E::KIND, id, "record not found");
                } else {
                    error!(entity = %E::KIND, id, %err, "failed to load record");
                }
                self.notifications
                    .failure(format!("Could not load {} {id}: {err}", E::KIND.label().to_lowercase()));
                self.navigate(Route::List(E::KIND));
            }
        }
    }

    fn submit<E: Routed>(&mut self, mode: FormMode, record: E) {
        let service = E::service(self).clone();
        self.spawn(
            async move {
                match mode.id() {
                    Some(id) => service.update(id, &record).await,
                    None => service.create(&record).await,
                }
            },
            |app, result| app.on_saved::<E>(result),
        );
    }

    fn on_saved<E: Routed>(&mut self, result: Result<i32, ServiceError>) {
        let label = E::KIND.label();
        match result {
            Ok(id) => {
                info!(entity = %E::KIND, id, "record saved");
                self.notifications.success(format!("{label} saved. ID: {id}"));
                self.navigate(Route::List(E::KIND));
            }
            Err(err) => {
                warn!(entity = %E::KIND, %err, "save failed");
                self.notifications
                    .failure(format!("Failed to save {}: {err}", label.to_lowercase()));
                if let Some(form) = E::form_mut(&mut self.screen) {
                    form.submit_failed();
                }
            }
        }
    }

    fn delete<E: Routed>(&mut self, id: i32) {
        let service = E::service(self).clone();
        self.spawn(async move { service.delete(id).await }, move |app, result| {
            app.on_deleted::<E>(id, result.map(|_| ()))
        });
    }

    fn on_deleted<E: Routed>(&mut self, id: i32, result: Result<(), ServiceError>) {
        if let Some(list) = E::list_mut(&mut self.screen) {
            if result.is_ok() {
                list.delete_succeeded(id);
            } else {
                list.delete_finished();
            }
        }

        let label = E::KIND.label();
        match result {
            Ok(()) => {
                info!(entity = %E::KIND, id, "record deleted");
                self.notifications.success(format!("{label} deleted."));
                self.fetch_list::<E>();
            }
            Err(err) => {
                warn!(entity = %E::KIND, id, %err, "delete failed");
                self.notifications
                    .failure(format!("Failed to delete {}: {err}", label.to_lowercase()));
            }
        }
    }

    fn login(&mut self, username: &str, password: &str) {
        match self.session.login(username, password) {
            Ok(()) => {
                self.notifications.success(format!("Welcome, {username}."));
                let landing = self.landing.take().unwrap_or(Route::Home);
                self.navigate(landing);
            }
            Err(err) => {
                self.notifications.failure(format!("Login failed: {err}"));
                if let Screen::Login(state) = &mut self.screen {
                    state.clear_password();
                }
            }
        }
    }

    fn logout(&mut self) {
        self.session.logout();
        self.landing = None;
        self.navigate(Route::Login);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.session.is_authenticated() && self.handle_shortcut(key.code) {
            return;
        }

        let code = key.code;
        match &mut self.screen {
            Screen::Login(state) => match login::handle_key(state, code) {
                Some(LoginAction::Submit { username, password }) => self.login(&username, &password),
                Some(LoginAction::Quit) => self.should_quit = true,
                None => {}
            },
            Screen::Home(state) => match home::handle_key(state, code) {
                Some(HomeAction::Open(kind)) => self.navigate(Route::List(kind)),
                Some(HomeAction::Logout) => self.logout(),
                Some(HomeAction::Quit) => self.should_quit = true,
                None => {}
            },
            Screen::ClientList(_) => self.list_key::<Client>(code),
            Screen::ClientForm(_) => self.form_key::<Client>(code),
            Screen::EmployeeList(_) => self.list_key::<Employee>(code),
            Screen::EmployeeForm(_) => self.form_key::<Employee>(code),
            Screen::ProductList(_) => self.list_key::<Product>(code),
            Screen::ProductForm(_) => self.form_key::<Product>(code),
        }
    }

    /// Navigation bar keys, available on every screen once logged in.
    fn handle_shortcut(&mut self, code: KeyCode) -> bool {
        let route = match code {
            KeyCode::F(1) => Route::Home,
            KeyCode::F(2) => Route::List(EntityKind::Employee),
            KeyCode::F(3) => Route::List(EntityKind::Client),
            KeyCode::F(4) => Route::List(EntityKind::Product),
            KeyCode::F(10) => {
                self.logout();
                return true;
            }
            _ => return false,
        };
        self.navigate(route);
        true
    }

    fn list_key<E: Routed>(&mut self, code: KeyCode) {
        let Some(state) = E::list_mut(&mut self.screen) else {
            return;
        };
        match entity_list::handle_key(state, code) {
            Some(ListAction::Back) => self.navigate(Route::Home),
            Some(ListAction::New) => self.navigate(Route::Create(E::KIND)),
            Some(ListAction::View(id)) => self.navigate(Route::View(E::KIND, id)),
            Some(ListAction::Edit(id)) => self.navigate(Route::Edit(E::KIND, id)),
            Some(ListAction::Delete(id)) => self.delete::<E>(id),
            None => {}
        }
    }

    fn form_key<E: Routed>(&mut self, code: KeyCode) {
        let Some(state) = E::form_mut(&mut self.screen) else {
            return;
        };
        let mode = state.mode();
        match entity_form::handle_key(state, code) {
            Some(FormAction::Cancel) => self.navigate(Route::List(E::KIND)),
            Some(FormAction::Submit(record)) => self.submit::<E>(mode, record),
            None => {}
        }
    }
}
