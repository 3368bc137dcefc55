/// Checks shared by every backend
#[cfg(any(feature = "milp", feature = "smt", feature = "cp"))]
mod common {
    use std::path::Path;
    use std::time::Duration;

    use strippack::bounds::HeightBounds;
    use strippack::entities::{Packing, Placement, SPInstance};
    use strippack::formulation::FormulationConfig;
    use strippack::io::import::read_instance;
    use strippack::solve::{SolveOptions, solve_instance};
    use strippack::solver::{SolveStatus, SolverBackend};
    use strippack::util::assertions::validate_packing;

    const TIME_LIMIT: Duration = Duration::from_secs(120);

    pub fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    pub fn options(rotation: bool, cumulative: bool, symmetry_breaking: bool) -> SolveOptions {
        SolveOptions {
            formulation: FormulationConfig {
                rotation,
                cumulative,
                symmetry_breaking,
            },
            time_limit: TIME_LIMIT,
            sort_by_area: true,
        }
    }

    /// Solves to optimality and checks every invariant of the returned packing.
    pub fn optimal_height(
        instance: &SPInstance,
        options: &SolveOptions,
        backend: &dyn SolverBackend,
    ) -> u64 {
        let solution = solve_instance(instance, options, backend).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        let packing = solution.packing.unwrap();
        assert_eq!(
            validate_packing(instance, &packing, options.formulation.rotation),
            Ok(())
        );
        assert!(HeightBounds::compute(instance).contains(packing.height));
        packing.height
    }

    pub fn asset_optimum(
        instance_path: &str,
        rotation: bool,
        expected: u64,
        backend: &dyn SolverBackend,
    ) {
        init_logger();
        let instance = read_instance(Path::new(instance_path)).unwrap();
        let height = optimal_height(&instance, &options(rotation, false, true), backend);
        assert_eq!(height, expected);
    }

    pub fn three_rectangles_without_rotation(backend: &dyn SolverBackend) {
        init_logger();
        let instance = SPInstance::new(10, &[4, 6, 4], &[3, 2, 2]).unwrap();
        assert_eq!(HeightBounds::compute(&instance).lower, 4);
        // 4x3 at (0,0), 6x2 at (4,0), 4x2 at (4,2) reaches the area bound
        assert_eq!(
            optimal_height(&instance, &options(false, true, true), backend),
            4
        );

        // the shelf-like arrangement of height 5 is valid, but not optimal
        let p = |x, y, width, height| Placement {
            x,
            y,
            width,
            height,
            rotated: false,
        };
        let shelves = Packing::fitted(10, vec![p(0, 0, 4, 3), p(4, 0, 6, 2), p(0, 3, 4, 2)]);
        assert_eq!(shelves.height, 5);
        assert_eq!(validate_packing(&instance, &shelves, false), Ok(()));
    }

    pub fn rotation_lowers_the_optimum(backend: &dyn SolverBackend) {
        init_logger();
        // the 2x5 rectangle has to lie flat on top of the 5x1 one
        let instance = SPInstance::new(5, &[2, 5], &[5, 1]).unwrap();
        assert_eq!(
            optimal_height(&instance, &options(false, true, true), backend),
            6
        );

        let solution = solve_instance(&instance, &options(true, true, true), backend).unwrap();
        let packing = solution.packing.unwrap();
        assert_eq!(packing.height, 3);
        assert!(packing.placements[0].rotated);
        assert_eq!((packing.placements[0].width, packing.placements[0].height), (5, 2));
        assert_eq!(validate_packing(&instance, &packing, true), Ok(()));
    }

    pub fn single_rectangle(backend: &dyn SolverBackend) {
        init_logger();
        let instance = SPInstance::new(5, &[5], &[7]).unwrap();
        for rotation in [false, true] {
            let solution =
                solve_instance(&instance, &options(rotation, true, true), backend).unwrap();
            let packing = solution.packing.unwrap();
            assert_eq!(packing.height, 7);
            assert_eq!((packing.placements[0].x, packing.placements[0].y), (0, 0));
            assert!(!packing.placements[0].rotated);
        }
    }

    pub fn tiny_time_budget_is_never_infeasible(backend: &dyn SolverBackend) {
        init_logger();
        let widths = [3, 4, 2, 5, 3, 6, 2, 4, 3, 5, 2, 3];
        let heights = [4, 2, 5, 3, 3, 2, 4, 3, 5, 2, 2, 6];
        let instance = SPInstance::new(12, &widths, &heights).unwrap();

        for time_limit in [Duration::ZERO, Duration::from_millis(1)] {
            let options = SolveOptions {
                time_limit,
                ..options(false, true, true)
            };
            let solution = solve_instance(&instance, &options, backend).unwrap();
            assert_ne!(solution.status, SolveStatus::Infeasible);
            assert_eq!(solution.status.has_solution(), solution.packing.is_some());
            if let Some(packing) = &solution.packing {
                assert_eq!(validate_packing(&instance, packing, false), Ok(()));
            }
        }
    }
}

#[cfg(all(test, feature = "milp"))]
mod milp {
    use test_case::test_case;

    use strippack::entities::SPInstance;
    use strippack::solve::SolveOptions;
    use strippack::solver::milp::MilpBackend;

    use crate::common::*;

    #[test_case("../assets/ins-1.txt", false, 8; "ins-1")]
    #[test_case("../assets/ins-1.txt", true, 8; "ins-1 rotation")]
    #[test_case("../assets/ins-2.txt", false, 5; "ins-2")]
    #[test_case("../assets/ins-2.txt", true, 5; "ins-2 rotation")]
    #[test_case("../assets/ins-3.txt", false, 4; "ins-3")]
    #[test_case("../assets/ins-3.txt", true, 4; "ins-3 rotation")]
    fn test_instance(instance_path: &str, rotation: bool, expected: u64) {
        asset_optimum(instance_path, rotation, expected, &MilpBackend);
    }

    #[test]
    fn three_rectangles() {
        three_rectangles_without_rotation(&MilpBackend);
    }

    #[test]
    fn rotation() {
        rotation_lowers_the_optimum(&MilpBackend);
    }

    #[test]
    fn one_rectangle() {
        single_rectangle(&MilpBackend);
    }

    #[test]
    fn tiny_time_budget() {
        tiny_time_budget_is_never_infeasible(&MilpBackend);
    }

    #[test_case(10, &[4, 6, 4], &[3, 2, 2]; "three rectangles")]
    #[test_case(6, &[3, 3, 2], &[2, 4, 3]; "uneven")]
    #[test_case(4, &[1, 2, 3], &[3, 2, 1]; "staircase")]
    fn redundant_constraints_keep_the_optimum(width: u64, widths: &[u64], heights: &[u64]) {
        init_logger();
        let instance = SPInstance::new(width, widths, heights).unwrap();
        let b = &MilpBackend;
        let bare = optimal_height(&instance, &options(false, false, false), b);
        assert_eq!(optimal_height(&instance, &options(false, true, false), b), bare);
        assert_eq!(optimal_height(&instance, &options(false, false, true), b), bare);
        assert_eq!(optimal_height(&instance, &options(false, true, true), b), bare);
    }

    #[test]
    fn input_order_does_not_change_the_optimum() {
        init_logger();
        let instance = SPInstance::new(6, &[3, 3, 2], &[2, 4, 3]).unwrap();
        let sorted = optimal_height(&instance, &options(true, false, true), &MilpBackend);
        let unsorted = optimal_height(
            &instance,
            &SolveOptions {
                sort_by_area: false,
                ..options(true, false, true)
            },
            &MilpBackend,
        );
        assert_eq!(sorted, unsorted);
    }
}

#[cfg(all(test, feature = "smt"))]
mod smt {
    use test_case::test_case;

    use strippack::entities::SPInstance;
    use strippack::solver::smt::SmtBackend;

    use crate::common::*;

    #[test_case("../assets/ins-1.txt", false, 8; "ins-1")]
    #[test_case("../assets/ins-1.txt", true, 8; "ins-1 rotation")]
    #[test_case("../assets/ins-2.txt", false, 5; "ins-2")]
    #[test_case("../assets/ins-2.txt", true, 5; "ins-2 rotation")]
    #[test_case("../assets/ins-3.txt", false, 4; "ins-3")]
    #[test_case("../assets/ins-3.txt", true, 4; "ins-3 rotation")]
    fn test_instance(instance_path: &str, rotation: bool, expected: u64) {
        asset_optimum(instance_path, rotation, expected, &SmtBackend);
    }

    #[test]
    fn three_rectangles() {
        three_rectangles_without_rotation(&SmtBackend);
    }

    #[test]
    fn rotation() {
        rotation_lowers_the_optimum(&SmtBackend);
    }

    #[test]
    fn one_rectangle() {
        single_rectangle(&SmtBackend);
    }

    #[test]
    fn tiny_time_budget() {
        tiny_time_budget_is_never_infeasible(&SmtBackend);
    }

    #[test]
    fn cumulative_keeps_the_optimum() {
        init_logger();
        let instance = SPInstance::new(6, &[3, 3, 2], &[2, 4, 3]).unwrap();
        let b = SmtBackend;
        let bare = optimal_height(&instance, &options(true, false, false), &b);
        assert_eq!(optimal_height(&instance, &options(true, true, true), &b), bare);
    }
}

#[cfg(all(test, feature = "cp"))]
mod cp {
    use test_case::test_case;

    use strippack::entities::SPInstance;
    use strippack::solver::cp::CpBackend;

    use crate::common::*;

    #[test_case("../assets/ins-1.txt", false, 8; "ins-1")]
    #[test_case("../assets/ins-1.txt", true, 8; "ins-1 rotation")]
    #[test_case("../assets/ins-2.txt", false, 5; "ins-2")]
    #[test_case("../assets/ins-2.txt", true, 5; "ins-2 rotation")]
    #[test_case("../assets/ins-3.txt", false, 4; "ins-3")]
    #[test_case("../assets/ins-3.txt", true, 4; "ins-3 rotation")]
    fn test_instance(instance_path: &str, rotation: bool, expected: u64) {
        asset_optimum(instance_path, rotation, expected, &CpBackend);
    }

    #[test]
    fn three_rectangles() {
        three_rectangles_without_rotation(&CpBackend);
    }

    #[test]
    fn rotation() {
        rotation_lowers_the_optimum(&CpBackend);
    }

    #[test]
    fn one_rectangle() {
        single_rectangle(&CpBackend);
    }

    #[test]
    fn tiny_time_budget() {
        tiny_time_budget_is_never_infeasible(&CpBackend);
    }

    #[test]
    fn cumulative_keeps_the_optimum() {
        init_logger();
        let instance = SPInstance::new(6, &[3, 3, 2], &[2, 4, 3]).unwrap();
        let bare = optimal_height(&instance, &options(true, false, false), &CpBackend);
        assert_eq!(optimal_height(&instance, &options(true, true, true), &CpBackend), bare);
    }
}
