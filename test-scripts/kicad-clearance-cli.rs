use std::process::ExitCode;
use std::str::FromStr;

use kicad_clearance::{
    Board, BoardDesignSettings, BoardItem, BoardLayer, ClearanceError, Condition, ConnectedItem,
    ConnectedKind, Constraint, DesignRule, GraphicItem, LayerSet, NetClass, Side, FORCE_ORPHANED,
    ORPHANED,
};

#[derive(Debug)]
struct CliConfig {
    min_clearance_nm: i64,
    edge_clearance_nm: i64,
    default_clearance_nm: Option<i64>,
    netclasses: Vec<(String, i64)>,
    nets: Vec<(i32, String, Option<String>)>,
    rules: Vec<(String, i64, Option<String>)>,
}

#[derive(Debug)]
enum ItemSpec {
    Connected { item: ConnectedItem, net: i32 },
    Edge(GraphicItem),
}

#[derive(Debug)]
struct PairQuery {
    a: ItemSpec,
    b: Option<ItemSpec>,
    layer: BoardLayer,
}

#[derive(Debug)]
enum Command {
    Resolve(PairQuery),
    Rule(PairQuery),
    Netclass { a: ItemSpec },
    Nets,
    Help,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if matches!(err, ClearanceError::UnknownNet { .. }) {
                eprintln!("hint: declare nets with `--net CODE:NAME[:NETCLASS]` before using them in an item.");
            }
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<(), ClearanceError> {
    let (config, command) = parse_args()?;

    if matches!(command, Command::Help) {
        print_help();
        return Ok(());
    }

    let board = build_board(&config)?;

    match command {
        Command::Resolve(query) => {
            let a = place_connected(&board, query.a)?;
            let b = query.b.map(|spec| place(&board, spec)).transpose()?;
            let clearance = board.clearance_with_source(&a, b.as_ref().map(Placed::as_item), query.layer);
            println!(
                "clearance_nm={} source={}",
                clearance.value_nm,
                clearance.source_label().unwrap_or_else(|| "-".to_string())
            );
        }
        Command::Rule(query) => {
            let a = place_connected(&board, query.a)?;
            let b = query.b.map(|spec| place(&board, spec)).transpose()?;
            match board.find_clearance_rule(&a, b.as_ref().map(Placed::as_item), query.layer) {
                Some(found) => println!(
                    "rule={} clearance_nm={} label={}",
                    found.rule_name(),
                    found.value_nm(),
                    found.label()
                ),
                None => println!("no clearance rule matched"),
            }
        }
        Command::Netclass { a } => {
            let a = place_connected(&board, a)?;
            let effective = board
                .effective_netclass(&a)
                .map(NetClass::name)
                .unwrap_or("-");
            println!(
                "net_code={} net_name={} netclass={} effective_netclass={}",
                board.net_code(&a),
                board.net_name(&a),
                board.netclass_name(&a).unwrap_or("-"),
                effective
            );
        }
        Command::Nets => {
            for net in board.nets().iter() {
                let class = net
                    .netclass()
                    .and_then(|id| board.netclasses().get(id))
                    .map(NetClass::name)
                    .unwrap_or("-");
                println!("code={} name={} netclass={}", net.code(), net.name(), class);
            }
        }
        Command::Help => print_help(),
    }

    Ok(())
}

enum Placed {
    Connected(ConnectedItem),
    Graphic(GraphicItem),
}

impl Placed {
    fn as_item(&self) -> BoardItem<'_> {
        match self {
            Self::Connected(item) => BoardItem::Connected(item),
            Self::Graphic(item) => BoardItem::Graphic(item),
        }
    }
}

fn place(board: &Board, spec: ItemSpec) -> Result<Placed, ClearanceError> {
    match spec {
        ItemSpec::Connected { mut item, net } => {
            board.attach(&mut item);
            board.assign_net(&mut item, net)?;
            Ok(Placed::Connected(item))
        }
        ItemSpec::Edge(item) => Ok(Placed::Graphic(item)),
    }
}

fn place_connected(board: &Board, spec: ItemSpec) -> Result<ConnectedItem, ClearanceError> {
    match place(board, spec)? {
        Placed::Connected(item) => Ok(item),
        Placed::Graphic(_) => Err(ClearanceError::Config {
            reason: "item A must be a connected item (track, arc, via, pad or zone)".to_string(),
        }),
    }
}

fn build_board(config: &CliConfig) -> Result<Board, ClearanceError> {
    let settings = BoardDesignSettings::builder()
        .min_clearance(config.min_clearance_nm)
        .copper_edge_clearance(config.edge_clearance_nm)
        .build()?;
    let mut board = Board::new(settings);

    if let Some(value) = config.default_clearance_nm {
        board.netclasses_mut().default_class_mut().clearance_nm = value;
    }

    for (name, clearance) in &config.netclasses {
        board.add_netclass(NetClass::builder(name.as_str()).clearance(*clearance).build()?)?;
    }

    for (code, name, class) in &config.nets {
        board.add_net(*code, name.as_str(), class.as_deref())?;
    }

    for (name, clearance, class) in &config.rules {
        let condition = match class {
            Some(class) => Condition::netclass(Side::Either, class.as_str()),
            None => Condition::Always,
        };
        board.rules_mut().push(
            DesignRule::new(name.as_str(), condition).with_constraint(Constraint::clearance(*clearance)),
        );
    }

    Ok(board)
}

fn parse_args() -> Result<(CliConfig, Command), ClearanceError> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        return Ok((default_config(), Command::Help));
    }

    let mut config = default_config();
    let mut index = 0;

    while index < args.len() {
        match args[index].as_str() {
            "--min-clearance" => {
                let value = option_value(&args, index)?;
                config.min_clearance_nm = parse_nm("--min-clearance", value)?;
                args.drain(index..=index + 1);
            }
            "--edge-clearance" => {
                let value = option_value(&args, index)?;
                config.edge_clearance_nm = parse_nm("--edge-clearance", value)?;
                args.drain(index..=index + 1);
            }
            "--default-clearance" => {
                let value = option_value(&args, index)?;
                config.default_clearance_nm = Some(parse_nm("--default-clearance", value)?);
                args.drain(index..=index + 1);
            }
            "--netclass" => {
                let value = option_value(&args, index)?;
                let (name, clearance) = value.split_once('=').ok_or_else(|| ClearanceError::Config {
                    reason: format!("invalid --netclass `{value}`; expected NAME=CLEARANCE_NM"),
                })?;
                config
                    .netclasses
                    .push((name.to_string(), parse_nm("--netclass", clearance)?));
                args.drain(index..=index + 1);
            }
            "--net" => {
                let value = option_value(&args, index)?;
                config.nets.push(parse_net(value)?);
                args.drain(index..=index + 1);
            }
            "--rule" => {
                let value = option_value(&args, index)?;
                config.rules.push(parse_rule(value)?);
                args.drain(index..=index + 1);
            }
            _ => {
                index += 1;
            }
        }
    }

    if args.is_empty() {
        return Ok((config, Command::Help));
    }

    let command = match args[0].as_str() {
        "help" | "--help" | "-h" => Command::Help,
        "nets" => Command::Nets,
        "resolve" => Command::Resolve(parse_pair_query(&args[1..])?),
        "rule" => Command::Rule(parse_pair_query(&args[1..])?),
        "netclass" => {
            let query = parse_pair_query(&args[1..])?;
            Command::Netclass { a: query.a }
        }
        other => {
            return Err(ClearanceError::Config {
                reason: format!("unknown command `{other}`"),
            });
        }
    };

    Ok((config, command))
}

fn option_value(args: &[String], index: usize) -> Result<&str, ClearanceError> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| ClearanceError::Config {
            reason: format!("missing value for {}", args[index]),
        })
}

fn parse_nm(option: &str, value: &str) -> Result<i64, ClearanceError> {
    value.parse::<i64>().map_err(|err| ClearanceError::Config {
        reason: format!("invalid {option} value `{value}`: {err}"),
    })
}

fn parse_net(value: &str) -> Result<(i32, String, Option<String>), ClearanceError> {
    let mut parts = value.splitn(3, ':');
    let code = parts.next().unwrap_or_default();
    let name = parts.next().ok_or_else(|| ClearanceError::Config {
        reason: format!("invalid --net `{value}`; expected CODE:NAME[:NETCLASS]"),
    })?;
    let code = code.parse::<i32>().map_err(|err| ClearanceError::Config {
        reason: format!("invalid net code in `{value}`: {err}"),
    })?;

    Ok((code, name.to_string(), parts.next().map(str::to_string)))
}

fn parse_rule(value: &str) -> Result<(String, i64, Option<String>), ClearanceError> {
    let (name, rest) = value.split_once('=').ok_or_else(|| ClearanceError::Config {
        reason: format!("invalid --rule `{value}`; expected NAME=CLEARANCE_NM[@NETCLASS]"),
    })?;
    let (clearance, class) = match rest.split_once('@') {
        Some((clearance, class)) => (clearance, Some(class.to_string())),
        None => (rest, None),
    };

    Ok((name.to_string(), parse_nm("--rule", clearance)?, class))
}

fn parse_pair_query(args: &[String]) -> Result<PairQuery, ClearanceError> {
    let mut a = None;
    let mut b = None;
    let mut layer = BoardLayer::F_CU;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--a" => {
                a = Some(parse_item(option_value(args, i)?)?);
                i += 2;
            }
            "--b" => {
                b = Some(parse_item(option_value(args, i)?)?);
                i += 2;
            }
            "--layer" => {
                layer = BoardLayer::from_str(option_value(args, i)?)?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let a = a.ok_or_else(|| ClearanceError::Config {
        reason: "missing --a ITEM".to_string(),
    })?;

    Ok(PairQuery { a, b, layer })
}

/// `KIND[,net=N][,layer=L][,override=NM][,local=NM][,name=S]`, or `edge`.
/// `N` may also be `orphaned` or `force-orphaned`.
fn parse_item(value: &str) -> Result<ItemSpec, ClearanceError> {
    let mut fields = value.split(',');
    let kind = fields.next().unwrap_or_default();

    if kind == "edge" {
        return Ok(ItemSpec::Edge(GraphicItem::edge_cut()));
    }

    let kind = ConnectedKind::from_str(kind).map_err(|reason| ClearanceError::Config { reason })?;
    let mut net = 0;
    let mut layer = BoardLayer::F_CU;
    let mut override_nm = None;
    let mut local_nm = None;
    let mut name = None;

    for field in fields {
        let (key, raw) = field.split_once('=').ok_or_else(|| ClearanceError::Config {
            reason: format!("invalid item field `{field}`; expected KEY=VALUE"),
        })?;
        match key {
            "net" => {
                net = match raw {
                    "orphaned" => ORPHANED,
                    "force-orphaned" => FORCE_ORPHANED,
                    _ => raw.parse::<i32>().map_err(|err| ClearanceError::Config {
                        reason: format!("invalid net `{raw}`: {err}"),
                    })?,
                };
            }
            "layer" => layer = BoardLayer::from_str(raw)?,
            "override" => override_nm = Some(parse_nm("override", raw)?),
            "local" => local_nm = Some(parse_nm("local", raw)?),
            "name" => name = Some(raw.to_string()),
            other => {
                return Err(ClearanceError::Config {
                    reason: format!("unknown item field `{other}`"),
                });
            }
        }
    }

    let layers = match kind {
        ConnectedKind::Via => LayerSet::all_copper(),
        ConnectedKind::Pad => LayerSet::single(layer).with(BoardLayer::B_CU),
        _ => LayerSet::single(layer),
    };
    let mut item = ConnectedItem::new(kind, layer, layers);
    if let Some(value) = override_nm {
        item = item.with_local_clearance_override(value);
    }
    if let Some(value) = local_nm {
        item = item.with_local_clearance(value);
    }
    if let Some(name) = name {
        item = item.with_name(name);
    }

    Ok(ItemSpec::Connected { item, net })
}

fn default_config() -> CliConfig {
    CliConfig {
        min_clearance_nm: 0,
        edge_clearance_nm: BoardDesignSettings::default().copper_edge_clearance_nm,
        default_clearance_nm: None,
        netclasses: Vec::new(),
        nets: Vec::new(),
        rules: Vec::new(),
    }
}

fn print_help() {
    println!(
        "kicad-clearance-cli\n\nUSAGE:\n  cargo run --bin kicad-clearance-cli -- [board options] <command> [command options]\n\nBOARD OPTIONS:\n  --min-clearance NM           Board minimum clearance\n  --edge-clearance NM          Copper to board edge clearance\n  --default-clearance NM       Clearance of the Default netclass\n  --netclass NAME=NM           Add a netclass (repeatable)\n  --net CODE:NAME[:NETCLASS]   Add a net (repeatable)\n  --rule NAME=NM[@NETCLASS]    Append a clearance rule (repeatable)\n\nCOMMANDS:\n  resolve --a ITEM [--b ITEM] [--layer L]   Resolve clearance and its source\n  rule --a ITEM [--b ITEM] [--layer L]      Show the first matching clearance rule\n  netclass --a ITEM                         Show net and netclass of an item\n  nets                                      List nets with their netclasses\n  help                                      Show help\n\nITEM:\n  KIND[,net=N][,layer=L][,override=NM][,local=NM][,name=S]\n  KIND is track | arc | via | pad | zone, or `edge` for a board outline segment\n  N is a net code, `orphaned` or `force-orphaned`\n"
    );
}
