//! DICT session over a single channel.
//!
//! A [`DictConnection`] is created by the greeting handshake and then serves one
//! command at a time. Each operation writes a command line, reads the status line and
//! consumes whatever data blocks and closing status that code implies before
//! returning, so the channel is always positioned at the start of the next response.
//!
//! # Example
//! ```rust,no_run
//! use dictum::{Database, DictConnection, MatchingStrategy};
//!
//! let mut connection = DictConnection::connect("dict.org").unwrap();
//!
//! let prefix = MatchingStrategy::named("prefix");
//! let words = connection.matches("hot", &prefix, &Database::all()).unwrap();
//!
//! for definition in connection.define(&words[0], &Database::first_match()).unwrap() {
//!     println!("{definition}");
//! }
//!
//! connection.close();
//! ```
use std::{
    collections::{HashMap, HashSet},
    io::{Read, Write},
    net::{TcpStream, ToSocketAddrs},
};

use log::{debug, info, warn};

use crate::model::{Database, Definition, MatchingStrategy};

use super::{
    ConnectionConfig, DictError, LineTransport, Status, split_atoms,
    status::{
        CLOSING, DATABASES_FOLLOW, DEFINITION_FOLLOWS, DEFINITIONS_FOLLOW, GREETING,
        INVALID_DATABASE, INVALID_STRATEGY, MATCHES_FOLLOW, NO_DATABASES, NO_MATCH,
        NO_STRATEGIES, OK, STRATEGIES_FOLLOW,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Channel open, greeting not yet accepted. Only held while the handshake
    /// runs; a handle returned to callers is never in this state.
    Connecting,
    /// Idle and able to accept the next command.
    Ready,
    /// Quit was sent or the channel can no longer be trusted.
    Closed,
}

/// Client side of a DICT session.
///
/// Every operation takes `&mut self`, so a command and its response can never
/// interleave with another one on the same channel.
pub struct DictConnection<T: Read + Write = TcpStream> {
    transport: LineTransport<T>,
    state: ConnectionState,
    banner: String,
}

impl DictConnection<TcpStream> {
    /// Connect to `host` on the default DICT port.
    pub fn connect(host: &str) -> Result<Self, DictError> {
        Self::connect_with(&ConnectionConfig::new(host))
    }

    pub fn connect_with_port(host: &str, port: u16) -> Result<Self, DictError> {
        Self::connect_with(&ConnectionConfig::new(host).port(port))
    }

    pub fn connect_with(config: &ConnectionConfig) -> Result<Self, DictError> {
        info!("connecting to {}:{}", config.host, config.port);
        let stream = open_stream(config)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.read_timeout)?;

        Self::from_stream(stream)
    }
}

fn open_stream(config: &ConnectionConfig) -> Result<TcpStream, DictError> {
    let target = format!("{}:{}", config.host, config.port);
    let failed = |source| DictError::Connection {
        reason: format!("could not connect to {target}"),
        source,
    };

    let Some(timeout) = config.connect_timeout else {
        return TcpStream::connect((config.host.as_str(), config.port)).map_err(|e| failed(Some(e)));
    };

    let addresses = (config.host.as_str(), config.port)
        .to_socket_addrs()
        .map_err(|e| failed(Some(e)))?;

    let mut last = None;
    for address in addresses {
        debug!("trying {address}");
        match TcpStream::connect_timeout(&address, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last = Some(e),
        }
    }

    Err(failed(last))
}

impl<T: Read + Write> DictConnection<T> {
    /// Run the greeting handshake over an already open channel.
    pub fn from_stream(stream: T) -> Result<Self, DictError> {
        let mut connection = Self {
            transport: LineTransport::new(stream),
            state: ConnectionState::Connecting,
            banner: String::new(),
        };

        let greeting = match connection.transport.read_status() {
            Ok(status) => status,
            Err(DictError::Protocol { reason, .. }) => {
                return Err(DictError::connection(format!("invalid greeting: {reason}")));
            }
            Err(e) => return Err(e),
        };

        if greeting.code != GREETING {
            return Err(DictError::connection(format!(
                "server refused connection: {greeting}"
            )));
        }

        info!("connected: {}", greeting.detail);
        connection.banner = greeting.detail;
        connection.state = ConnectionState::Ready;
        Ok(connection)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Text the server sent along with its 220 greeting.
    pub fn banner(&self) -> &str {
        &self.banner
    }

    pub fn get_ref(&self) -> &T {
        self.transport.get_ref()
    }

    /// All databases offered by the server, keyed by name.
    pub fn databases(&mut self) -> Result<HashMap<String, Database>, DictError> {
        let status = self.command("SHOW DB")?;

        match status.code {
            DATABASES_FOLLOW => {
                let mut databases = HashMap::new();
                for line in self.read_listing()? {
                    let (name, description) = name_and_description(&line)?;
                    databases.insert(name.clone(), Database::new(name, description));
                }
                debug!("server lists {} databases", databases.len());
                Ok(databases)
            }
            NO_DATABASES => {
                debug!("server has no databases");
                Ok(HashMap::new())
            }
            _ => Err(self.unexpected(&status)),
        }
    }

    /// Matching strategies in the order the server lists them.
    pub fn strategies(&mut self) -> Result<Vec<MatchingStrategy>, DictError> {
        let status = self.command("SHOW STRAT")?;

        match status.code {
            STRATEGIES_FOLLOW => {
                let mut strategies: Vec<MatchingStrategy> = Vec::new();
                let mut seen = HashSet::new();
                for line in self.read_listing()? {
                    let (name, description) = name_and_description(&line)?;
                    if seen.insert(name.clone()) {
                        strategies.push(MatchingStrategy::new(name, description));
                    }
                }
                debug!("server lists {} strategies", strategies.len());
                Ok(strategies)
            }
            NO_STRATEGIES => {
                debug!("server has no strategies");
                Ok(Vec::new())
            }
            _ => Err(self.unexpected(&status)),
        }
    }

    /// Words matching `word` under `strategy`, without duplicates and in server order.
    ///
    /// `word` is sent inside double quotes as-is; a word containing `"` breaks the
    /// command line.
    pub fn matches(
        &mut self,
        word: &str,
        strategy: &MatchingStrategy,
        database: &Database,
    ) -> Result<Vec<String>, DictError> {
        let status = self.command(&format!(
            "MATCH {} {} \"{word}\"",
            database.name(),
            strategy.name()
        ))?;

        match status.code {
            MATCHES_FOLLOW => {
                let mut words: Vec<String> = Vec::new();
                let mut seen = HashSet::new();
                for line in self.read_listing()? {
                    let matched = split_atoms(&line).into_iter().nth(1).ok_or_else(|| {
                        DictError::protocol(format!("malformed match line '{line}'"))
                    })?;
                    if seen.insert(matched.clone()) {
                        words.push(matched);
                    }
                }
                debug!("{} matches for '{word}'", words.len());
                Ok(words)
            }
            INVALID_DATABASE => Err(DictError::InvalidDatabase(status.detail)),
            INVALID_STRATEGY => Err(DictError::InvalidStrategy(status.detail)),
            NO_MATCH => {
                debug!("no matches for '{word}'");
                Ok(Vec::new())
            }
            _ => Err(self.unexpected(&status)),
        }
    }

    /// Every definition of `word` in `database`, in the order the server sent them.
    pub fn define(&mut self, word: &str, database: &Database) -> Result<Vec<Definition>, DictError> {
        let status = self.command(&format!("DEFINE {} \"{word}\"", database.name()))?;

        match status.code {
            DEFINITIONS_FOLLOW => {
                let count = split_atoms(&status.detail)
                    .first()
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| {
                        DictError::protocol(format!("invalid definition count '{}'", status.detail))
                    });
                let count = match count {
                    Ok(count) => count,
                    Err(e) => return Err(self.desync(e)),
                };

                // count comes from the server; let the vector grow as blocks arrive
                let mut definitions = Vec::new();
                for _ in 0..count {
                    definitions.push(self.read_definition(word)?);
                }
                self.expect_ok()?;

                debug!("{} definitions for '{word}'", definitions.len());
                Ok(definitions)
            }
            INVALID_DATABASE => Err(DictError::InvalidDatabase(status.detail)),
            NO_MATCH => {
                debug!("no definitions for '{word}'");
                Ok(Vec::new())
            }
            _ => Err(self.unexpected(&status)),
        }
    }

    /// Send `QUIT` and release the channel. Failures along the way are ignored.
    ///
    /// Waits for the server's reply; without a read timeout in the
    /// [`ConnectionConfig`] a silent server can hold this call.
    pub fn close(mut self) {
        self.quit(true);
    }

    fn read_definition(&mut self, word: &str) -> Result<Definition, DictError> {
        let header = self.read_status()?;
        if header.code != DEFINITION_FOLLOWS {
            let err = DictError::unexpected(header.code, &header.detail);
            return Err(self.desync(err));
        }

        let Some(database) = split_atoms(&header.detail).into_iter().nth(1) else {
            let err = DictError::protocol(format!("malformed definition header '{header}'"));
            return Err(self.desync(err));
        };

        let body = self.read_block()?;
        Ok(Definition::new(word, database, body))
    }

    fn command(&mut self, line: &str) -> Result<Status, DictError> {
        if self.state != ConnectionState::Ready {
            return Err(DictError::connection("connection is closed"));
        }

        let result = self
            .transport
            .write_line(line)
            .and_then(|()| self.transport.read_status());
        self.track(result)
    }

    fn read_status(&mut self) -> Result<Status, DictError> {
        let result = self.transport.read_status();
        self.track(result)
    }

    fn read_block(&mut self) -> Result<Vec<String>, DictError> {
        let result = self.transport.read_block();
        self.track(result)
    }

    /// Data block followed by its closing 250; lines are handed back only once both
    /// have been consumed.
    fn read_listing(&mut self) -> Result<Vec<String>, DictError> {
        let block = self.read_block()?;
        self.expect_ok()?;
        Ok(block)
    }

    fn expect_ok(&mut self) -> Result<(), DictError> {
        let status = self.read_status()?;
        if status.code != OK {
            return Err(DictError::unexpected(status.code, &status.detail));
        }
        Ok(())
    }

    /// Closes the handle on failures that leave the channel at an unknown position.
    fn track<R>(&mut self, result: Result<R, DictError>) -> Result<R, DictError> {
        match &result {
            Err(err @ DictError::Connection { .. }) => {
                warn!("connection lost: {err}");
                self.state = ConnectionState::Closed;
            }
            // malformed status line
            Err(err @ DictError::Protocol { code: None, .. }) => {
                warn!("response out of sync: {err}");
                self.state = ConnectionState::Closed;
            }
            _ => {}
        }
        result
    }

    fn desync(&mut self, err: DictError) -> DictError {
        warn!("response out of sync: {err}");
        self.state = ConnectionState::Closed;
        err
    }

    fn unexpected(&mut self, status: &Status) -> DictError {
        let err = DictError::unexpected(status.code, &status.detail);
        // 1yz codes announce data that nobody will read
        if (100..200).contains(&status.code) {
            self.desync(err)
        } else {
            err
        }
    }

    /// Send `QUIT`, then optionally wait for the server's reply.
    fn quit(&mut self, await_reply: bool) {
        self.state = ConnectionState::Closed;

        if let Err(e) = self.transport.write_line("QUIT") {
            warn!("failed to send QUIT: {e}");
            return;
        }

        if !await_reply {
            info!("connection closed");
            return;
        }

        match self.transport.read_status() {
            Ok(status) if status.code == CLOSING => debug!("server said goodbye: {}", status.detail),
            Ok(status) => debug!("unexpected reply to QUIT: {status}"),
            Err(e) => debug!("no reply to QUIT: {e}"),
        }
        info!("connection closed");
    }
}

/// Dropping a `Ready` handle sends `QUIT` without reading the reply, so it never
/// blocks on an unresponsive server.
impl<T: Read + Write> Drop for DictConnection<T> {
    fn drop(&mut self) {
        if self.state == ConnectionState::Ready {
            self.quit(false);
        }
    }
}

fn name_and_description(line: &str) -> Result<(String, String), DictError> {
    let mut atoms = split_atoms(line).into_iter();
    match (atoms.next(), atoms.next()) {
        (Some(name), Some(description)) => Ok((name, description)),
        _ => Err(DictError::protocol(format!("malformed listing line '{line}'"))),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        io,
        rc::Rc,
    };

    use super::*;
    use crate::protocol::{ErrorKind, transport::tests::Scripted};

    const GREETING_LINE: &str =
        "220 dict.dict.org dictd 1.12.1/rf on Linux 4.19.0-10-amd64 <auth.mime> <100@dict.dict.org>\r\n";

    fn connect(script: &str) -> DictConnection<Scripted> {
        DictConnection::from_stream(Scripted::new(&format!("{GREETING_LINE}{script}"))).unwrap()
    }

    #[test]
    fn handshake_records_banner() {
        let connection = connect("");

        assert_eq!(connection.state(), ConnectionState::Ready);
        assert!(connection.banner().starts_with("dict.dict.org dictd"));
    }

    #[test]
    #[should_panic(expected = "server refused connection")]
    fn handshake_rejects_other_codes() {
        DictConnection::from_stream(Scripted::new("530 access denied\r\n")).unwrap();
    }

    #[test]
    fn handshake_garbage_is_connection_error() {
        let err = DictConnection::from_stream(Scripted::new("hello there\r\n"))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn handshake_on_silent_server() {
        let err = DictConnection::from_stream(Scripted::new("")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn lists_databases() {
        let mut connection = connect(
            "110 3 databases present\r\n\
             gcide \"The Collaborative International Dictionary of English v.0.48\"\r\n\
             wn \"WordNet (r) 3.0 (2006)\"\r\n\
             jargon \"The Jargon File (version 4.4.7, 29 Dec 2003)\"\r\n\
             .\r\n\
             250 ok\r\n",
        );

        let databases = connection.databases().unwrap();

        assert_eq!(databases.len(), 3);
        assert_eq!(databases["wn"].description(), "WordNet (r) 3.0 (2006)");
        assert_eq!(databases["gcide"].name(), "gcide");
        assert!(connection.get_ref().sent().starts_with("SHOW DB\n"));
    }

    #[test]
    fn no_databases_is_empty() {
        let mut connection = connect("554 No databases present\r\n");

        assert!(connection.databases().unwrap().is_empty());
        assert_eq!(connection.state(), ConnectionState::Ready);
    }

    #[test]
    fn listing_requires_closing_ok() {
        let mut connection = connect("110 1 databases present\r\nwn \"WordNet\"\r\n.\r\n420 busy\r\n");

        let err = connection.databases().unwrap_err();
        assert_eq!(err.code(), Some(420));
    }

    #[test]
    fn malformed_listing_line_keeps_connection_usable() {
        let mut connection = connect(
            "110 1 databases present\r\nlonely\r\n.\r\n250 ok\r\n554 No databases present\r\n",
        );

        let err = connection.databases().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(connection.state(), ConnectionState::Ready);
        assert!(connection.databases().unwrap().is_empty());
    }

    #[test]
    fn lists_strategies_in_order() {
        let mut connection = connect(
            "111 4 strategies present\r\n\
             exact \"Match headwords exactly\"\r\n\
             prefix \"Match prefixes\"\r\n\
             exact \"Match headwords exactly\"\r\n\
             soundex \"Match using SOUNDEX algorithm\"\r\n\
             .\r\n\
             250 ok\r\n",
        );

        let strategies = connection.strategies().unwrap();
        let names: Vec<&str> = strategies.iter().map(|s| s.name()).collect();

        assert_eq!(names, vec!["exact", "prefix", "soundex"]);
        assert_eq!(strategies[1].description(), "Match prefixes");
        assert_eq!(connection.get_ref().sent(), "SHOW STRAT\n");
    }

    #[test]
    fn no_strategies_is_empty() {
        let mut connection = connect("555 No strategies available\r\n");
        assert!(connection.strategies().unwrap().is_empty());
    }

    #[test]
    fn matches_take_second_atom() {
        let mut connection = connect(
            "152 4 matches found\r\n\
             wn \"hot dog\"\r\n\
             wn \"hot\"\r\n\
             gcide \"hot\"\r\n\
             gcide \"hotbed\"\r\n\
             .\r\n\
             250 ok\r\n",
        );

        let words = connection
            .matches("hot", &MatchingStrategy::named("prefix"), &Database::all())
            .unwrap();

        assert_eq!(words, vec!["hot dog", "hot", "hotbed"]);
        assert_eq!(connection.get_ref().sent(), "MATCH * prefix \"hot\"\n");
    }

    #[test]
    fn word_is_quoted_verbatim() {
        let mut connection = connect("552 no match\r\n");

        connection
            .matches("hot dog", &MatchingStrategy::named("exact"), &Database::named("wn"))
            .unwrap();

        assert_eq!(connection.get_ref().sent(), "MATCH wn exact \"hot dog\"\n");
    }

    #[test]
    fn invalid_database_leaves_connection_ready() {
        let mut connection = connect(
            "550 invalid database, use SHOW DB for list\r\n\
             552 no match\r\n",
        );

        let err = connection
            .matches("foo", &MatchingStrategy::named("exact"), &Database::named("nope"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidDatabase);
        assert_eq!(err.server_text(), Some("invalid database, use SHOW DB for list"));
        assert_eq!(connection.state(), ConnectionState::Ready);

        let words = connection
            .matches("foo", &MatchingStrategy::named("exact"), &Database::all())
            .unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn invalid_strategy() {
        let mut connection = connect("551 invalid strategy, use SHOW STRAT for list\r\n");

        let err = connection
            .matches("foo", &MatchingStrategy::named("bogus"), &Database::all())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStrategy);
    }

    #[test]
    fn defines_in_server_order() {
        let mut connection = connect(
            "150 2 definitions retrieved\r\n\
             151 \"foo\" db1 \"First database\"\r\n\
             foo\r\n\
             \x20  first meaning\r\n\
             .\r\n\
             151 \"foo\" db2 \"Second database\"\r\n\
             foo\r\n\
             \x20  second meaning\r\n\
             .\r\n\
             250 ok [d/m/c = 2/0/30; 0.000r 0.000u 0.000s]\r\n",
        );

        let definitions = connection.define("foo", &Database::all()).unwrap();

        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions[0].database(), "db1");
        assert_eq!(definitions[1].database(), "db2");
        assert_eq!(definitions[0].word(), "foo");
        assert_eq!(definitions[0].lines(), ["foo", "   first meaning"]);
        assert_eq!(definitions[1].text(), "foo\n   second meaning");
        assert_eq!(connection.get_ref().sent(), "DEFINE * \"foo\"\n");
        assert_eq!(connection.state(), ConnectionState::Ready);
    }

    #[test]
    fn define_without_result() {
        let mut connection = connect("552 no match\r\n");
        assert!(connection.define("zzzz", &Database::named("wn")).unwrap().is_empty());
    }

    #[test]
    fn define_invalid_database() {
        let mut connection = connect("550 invalid database\r\n");

        let err = connection.define("foo", &Database::named("nope")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDatabase);
    }

    #[test]
    fn define_missing_definition_header_closes() {
        let mut connection = connect(
            "150 2 definitions retrieved\r\n\
             151 \"foo\" db1 \"First database\"\r\n\
             foo\r\n\
             .\r\n\
             250 ok\r\n",
        );

        let err = connection.define("foo", &Database::all()).unwrap_err();

        assert_eq!(err.code(), Some(250));
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[test]
    fn define_bad_count_closes() {
        let mut connection = connect("150 several definitions retrieved\r\n");

        let err = connection.define("foo", &Database::all()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[test]
    fn huge_definition_count_does_not_preallocate() {
        let mut connection = connect("150 18446744073709551615 definitions retrieved\r\n");

        let err = connection.define("foo", &Database::all()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[test]
    fn truncated_second_definition_returns_nothing() {
        let mut connection = connect(
            "150 2 definitions retrieved\r\n\
             151 \"foo\" db1 \"First database\"\r\n\
             foo\r\n\
             .\r\n\
             151 \"foo\" db2 \"Second database\"\r\n\
             foo\r\n\
             \x20  half of a meaning\r\n",
        );

        let result = connection.define("foo", &Database::all());

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[test]
    fn define_requires_closing_ok() {
        let mut connection = connect(
            "150 1 definitions retrieved\r\n\
             151 \"foo\" db1 \"First database\"\r\n\
             foo\r\n\
             .\r\n\
             420 server temporarily unavailable\r\n",
        );

        let err = connection.define("foo", &Database::all()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.code(), Some(420));
        assert_eq!(connection.state(), ConnectionState::Ready);
    }

    #[test]
    fn unexpected_code_is_protocol_error() {
        let mut connection = connect("500 syntax error, command not recognized\r\n");

        let err = connection.databases().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.code(), Some(500));
        assert_eq!(connection.state(), ConnectionState::Ready);
    }

    #[test]
    fn unexpected_data_code_closes() {
        let mut connection = connect("110 1 databases present\r\nwn \"WordNet\"\r\n.\r\n250 ok\r\n");

        let err = connection.define("foo", &Database::all()).unwrap_err();

        assert_eq!(err.code(), Some(110));
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[test]
    fn truncated_block_closes_connection() {
        let mut connection = connect("110 2 databases present\r\nwn \"WordNet\"\r\n");

        let err = connection.databases().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(connection.state(), ConnectionState::Closed);

        let err = connection.strategies().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(connection.get_ref().sent(), "SHOW DB\n");
    }

    #[test]
    fn close_sends_quit() {
        let mut connection = connect("221 bye [d/m/c = 0/0/0; 1.000r 0.000u 0.000s]\r\n");

        connection.quit(true);

        assert_eq!(connection.get_ref().sent(), "QUIT\n");
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[test]
    fn close_after_failure_still_sends_quit() {
        let mut connection = connect("110 2 databases present\r\n");
        connection.databases().unwrap_err();

        connection.quit(true);
        assert_eq!(connection.get_ref().sent(), "SHOW DB\nQUIT\n");
    }

    /// Stream that greets and records whether it was read after `QUIT` was written.
    struct Watched {
        input: io::Cursor<Vec<u8>>,
        output: Rc<RefCell<Vec<u8>>>,
        read_after_quit: Rc<Cell<bool>>,
    }

    impl Read for Watched {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.output.borrow().ends_with(b"QUIT\n") {
                self.read_after_quit.set(true);
            }
            self.input.read(buf)
        }
    }

    impl Write for Watched {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn drop_sends_quit_without_waiting_for_reply() {
        let output = Rc::new(RefCell::new(Vec::new()));
        let read_after_quit = Rc::new(Cell::new(false));

        let connection = DictConnection::from_stream(Watched {
            input: io::Cursor::new(GREETING_LINE.as_bytes().to_vec()),
            output: Rc::clone(&output),
            read_after_quit: Rc::clone(&read_after_quit),
        })
        .unwrap();
        drop(connection);

        assert_eq!(output.borrow().as_slice(), b"QUIT\n".as_slice());
        assert!(!read_after_quit.get());
    }

    /// Stream that greets and then fails every write.
    struct Broken {
        greeting: io::Cursor<Vec<u8>>,
    }

    impl Read for Broken {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.greeting.read(buf)
        }
    }

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn close_on_broken_channel_does_not_raise() {
        let connection = DictConnection::from_stream(Broken {
            greeting: io::Cursor::new(GREETING_LINE.as_bytes().to_vec()),
        })
        .unwrap();

        connection.close();
    }

    #[test]
    fn write_failure_is_connection_error() {
        let mut connection = DictConnection::from_stream(Broken {
            greeting: io::Cursor::new(GREETING_LINE.as_bytes().to_vec()),
        })
        .unwrap();

        let err = connection.databases().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(connection.state(), ConnectionState::Closed);
    }
}
