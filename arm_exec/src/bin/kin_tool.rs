//! # Kinematics Tool
//!
//! Command line access to the arm kinematics, for inspecting DH chains and checking forward and
//! inverse solutions without running the executable.
//!
//! ```text
//! kin_tool chain --save
//! kin_tool fk 0.3 0.5 -0.2
//! kin_tool ik 0.5 0.6 0.7 --no-limits
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use nalgebra::Point3;
use owo_colors::OwoColorize;
use structopt::{clap::AppSettings, StructOpt};

use arm_lib::{
    arm_ctrl,
    dh_chain::{DhTable, Expr, LinkParams},
    fwd_kin::{arm_dh_table, ForwardKinematics},
    ik::{IkSolution, IkSolver},
};
use util::{
    logger::{logger_init_stdout, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "kin_tool", about = "Arm kinematics tool")]
enum Cmd {
    /// Build a DH chain from a parameter file and print every transform.
    Chain {
        /// Parameter file relative to the params directory.
        #[structopt(long, default_value = "dh_chain.toml")]
        params: String,

        /// Save the transforms into a new session.
        #[structopt(long)]
        save: bool,
    },

    /// End effector pose for the given joint angles in radians.
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Fk { theta1: f64, theta2: f64, theta3: f64 },

    /// Joint solutions for an end effector position in meters.
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Ik {
        x: f64,
        y: f64,
        z: f64,

        /// Report every solution as valid regardless of the joint limits.
        #[structopt(long)]
        no_limits: bool,
    },
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    let cmd = Cmd::from_args();

    logger_init_stdout(LevelFilter::Info).wrap_err("Failed to initialise logging")?;

    match cmd {
        Cmd::Chain { params, save } => chain(&params, save),
        Cmd::Fk {
            theta1,
            theta2,
            theta3,
        } => fk((theta1, theta2, theta3)),
        Cmd::Ik { x, y, z, no_limits } => ik(Point3::new(x, y, z), no_limits),
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn chain(params_path: &str, save: bool) -> Result<()> {
    let table: DhTable = util::params::load(params_path)
        .wrap_err_with(|| format!("Could not load DH table from {}", params_path))?;

    print_table(&table);

    let mut chain = table.build().wrap_err("Could not build the chain")?;
    let declared = chain.declared();
    let compounds: Vec<_> = declared.iter().copied().filter(|id| id.is_compound()).collect();

    chain
        .simplify_matrices(&compounds)
        .wrap_err("Could not simplify the chain")?;

    for id in declared.iter() {
        println!("\n{}", id.bold());
        println!("{}", chain.get(*id, false)?);

        if id.is_compound() {
            println!("{} {}", id.bold(), "simplified".green());
            println!("{}", chain.get(*id, true)?);
        }
    }

    if let Some(last) = compounds.last() {
        println!("\n{}", "End effector".bold());
        println!("{}", chain.extract_pose(*last, true)?);
    }

    if save {
        let session =
            Session::new("kin_tool", "sessions").wrap_err("Failed to create the session")?;

        chain.save_matrices(&declared, false, "")?;
        chain.save_matrices(&compounds, true, "_simplified")?;

        info!("Transforms saved to {:?}", session.session_root);
        session.exit();
    }

    Ok(())
}

fn fk(joints_rad: (f64, f64, f64)) -> Result<()> {
    let fk = ForwardKinematics::new().wrap_err("Failed to build the forward model")?;
    let pose = fk.solve_pose(joints_rad)?;

    println!("{}", "Position (m)".bold());
    println!(
        "    x = {:.6}, y = {:.6}, z = {:.6}",
        pose.position_m.x, pose.position_m.y, pose.position_m.z
    );
    println!("{}", "Orientation".bold());
    println!("{:.6}", pose.orientation);

    Ok(())
}

fn ik(target_m: Point3<f64>, no_limits: bool) -> Result<()> {
    let mut params = match util::params::load::<arm_ctrl::Params>("arm_ctrl.toml") {
        Ok(p) => p.ik,
        Err(e) => {
            warn!("Could not load arm_ctrl.toml, using default limits: {}", e);
            Default::default()
        }
    };
    if no_limits {
        params.enforce_joint_limits = false;
    }

    println!("{}", "Arm".bold());
    print_table(&arm_dh_table());

    println!("{}", "Joint limits (deg)".bold());
    if params.enforce_joint_limits {
        println!(
            "    theta2: [{:.1}, {:.1}]",
            params.theta2_min_rad.to_degrees(),
            params.theta2_max_rad.to_degrees()
        );
        println!(
            "    theta3: [{:.1}, {:.1}]",
            params.theta3_min_rad.to_degrees(),
            params.theta3_max_rad.to_degrees()
        );
    } else {
        println!("    {}", "not enforced".yellow());
    }

    println!("{}", "Target (m)".bold());
    println!(
        "    x = {}, y = {}, z = {}",
        target_m.x, target_m.y, target_m.z
    );

    let result = IkSolver::new(params).solve(&target_m);

    if result.num_candidates() == 0 {
        println!("{}", "Target is outside the workspace".red());
        return Ok(());
    }
    if result.unreachable {
        println!("{}", "One base branch cannot reach the target".yellow());
    }

    print_solutions("Valid solutions", &result.valid);
    print_solutions("Invalid solutions", &result.invalid);

    Ok(())
}

fn print_table(table: &DhTable) {
    println!("    chain length: {}", table.chain_length);
    for (id, link) in table.links.iter() {
        println!("    {}: {}", id, format_link(link));
    }
}

fn format_link(link: &LinkParams) -> String {
    let fmt = |e: &Option<Expr>| match e {
        Some(e) => format!("{}", e),
        None => String::from("free"),
    };

    format!(
        "alpha = {}, r = {}, d = {}, theta = {}",
        fmt(&link.alpha),
        fmt(&link.r),
        fmt(&link.d),
        fmt(&link.theta)
    )
}

fn print_solutions(title: &str, solutions: &[IkSolution]) {
    println!("{} ({})", title.bold(), solutions.len());
    for s in solutions {
        println!("    {}", s);
    }
}
